use crate::dispatch::Dispatcher;
use anyhow::Context;
use chrono::NaiveDateTime;
use shared::{AppError, Reply};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// 1行1件のインタラクションを読み、返信を1行ずつ書く
///
/// UTF-8として読めない行もエラー返信を返して次の行へ進む。入力が閉じたら終了する。
pub async fn serve<R, W, N>(
    dispatcher: &Dispatcher,
    mut reader: R,
    mut writer: W,
    now: N,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    N: Fn() -> NaiveDateTime,
{
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .await
            .context("failed to read interaction")?;
        if read == 0 {
            return Ok(());
        }

        let reply = match std::str::from_utf8(&buffer) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => dispatcher.handle_line(line.trim(), now()).await,
            Err(e) => {
                warn!(error = %e, bytes = buffer.len(), "Interaction is not valid UTF-8");
                Reply::from_error(&AppError::Deserialization(e.to_string()))
            }
        };

        let mut output = serde_json::to_vec(&reply).context("failed to serialize reply")?;
        output.push(b'\n');
        writer
            .write_all(&output)
            .await
            .context("failed to write reply")?;
        writer.flush().await.context("failed to flush reply")?;
    }
}
