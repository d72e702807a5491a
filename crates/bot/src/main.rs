mod dispatch;
mod serve;

use anyhow::{anyhow, Context};
use chrono::Local;
use dispatch::Dispatcher;
use infrastructure::RecordStores;
use shared::{init_tracing, Config};
use tokio::io::BufReader;
use tracing::info;

/// 標準入力から1行1件のインタラクションを読み、返信を1行ずつ標準出力に書く
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;

    let config = Config::from_env().context("failed to load configuration")?;

    info!(
        environment = %config.environment,
        guild_id = ?config.guild_id,
        data_dir = %config.data_dir.display(),
        logs_channel = %config.logs_channel,
        punch_in_window = %config.punch_in_window,
        "Attendance bot starting"
    );

    let dispatcher = Dispatcher::new(RecordStores::new(&config), config.punch_in_window);

    serve::serve(
        &dispatcher,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        || Local::now().naive_local(),
    )
    .await?;

    info!("Input closed, shutting down");
    Ok(())
}
