use crate::errors::AppError;
use domain::PunchInWindow;
use std::env;
use std::path::PathBuf;

pub const ATTENDANCE_FILE: &str = "attendance.json";
pub const TASKS_FILE: &str = "tasks.json";

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub guild_id: Option<u64>,
    pub data_dir: PathBuf,
    pub punch_in_window: PunchInWindow,
    pub logs_channel: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意の取得関数から設定を組み立てる（テスト用に環境変数を差し替えられる）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| AppError::Configuration("DISCORD_TOKEN is not set".to_string()))?;

        let guild_id = lookup("GUILD_ID")
            .filter(|id| !id.trim().is_empty())
            .map(|id| {
                id.trim()
                    .parse::<u64>()
                    .map_err(|e| AppError::Configuration(format!("GUILD_ID {id:?}: {e}")))
            })
            .transpose()?;

        let punch_in_window = PunchInWindow::parse(
            &lookup("PUNCH_IN_START").unwrap_or_else(|| "09:30".to_string()),
            &lookup("PUNCH_IN_END").unwrap_or_else(|| "10:30".to_string()),
        )
        .map_err(|e| AppError::Configuration(e.to_string()))?;

        Ok(Config {
            discord_token,
            guild_id,
            data_dir: lookup("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            punch_in_window,
            logs_channel: lookup("LOGS_CHANNEL").unwrap_or_else(|| "fapps-bot-logs".to_string()),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
        })
    }

    pub fn attendance_path(&self) -> PathBuf {
        self.data_dir.join(ATTENDANCE_FILE)
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.data_dir.join(TASKS_FILE)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"<redacted>")
            .field("guild_id", &self.guild_id)
            .field("data_dir", &self.data_dir)
            .field("punch_in_window", &self.punch_in_window.to_string())
            .field("logs_channel", &self.logs_channel)
            .field("environment", &self.environment)
            .finish()
    }
}
