use domain::DomainError;
use thiserror::Error;

/// アプリケーション全体で使用されるエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // ドメインエラー
    #[error("Domain error: {0}")]
    Domain(DomainError),

    // ストレージエラー
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // 権限・入力エラー
    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // システムエラー
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// エラーの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 利用者の入力や権限に起因するエラー
    Client,
    /// ボット側の障害
    Server,
}

/// エラーの重要度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// エラーメタデータ
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
}

impl ErrorMetadata {
    fn new(code: &'static str, category: ErrorCategory, severity: ErrorSeverity) -> Self {
        Self {
            code,
            category,
            severity,
        }
    }
}

const GENERIC_MESSAGE: &str = "⚠️ Something went wrong. Please try again later.";

impl AppError {
    /// エラーメタデータを取得
    pub fn metadata(&self) -> ErrorMetadata {
        use ErrorCategory::*;
        use ErrorSeverity::*;

        match self {
            AppError::Domain(_) => ErrorMetadata::new("DOMAIN_ERROR", Client, Info),
            AppError::Validation(_) => ErrorMetadata::new("VALIDATION_ERROR", Client, Info),
            AppError::NotFound(_) => ErrorMetadata::new("NOT_FOUND", Client, Info),
            AppError::Authorization(_) => {
                ErrorMetadata::new("AUTHORIZATION_ERROR", Client, Warning)
            }
            AppError::Deserialization(_) => {
                ErrorMetadata::new("DESERIALIZATION_ERROR", Client, Warning)
            }
            AppError::Storage(_) => ErrorMetadata::new("STORAGE_ERROR", Server, Error),
            AppError::Serialization(_) => {
                ErrorMetadata::new("SERIALIZATION_ERROR", Server, Error)
            }
            AppError::Configuration(_) => {
                ErrorMetadata::new("CONFIGURATION_ERROR", Server, Critical)
            }
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.metadata().category == ErrorCategory::Client
    }

    /// 利用者向けメッセージを取得
    /// サーバー側のエラーは詳細を伏せた汎用メッセージにする
    pub fn user_message(&self) -> String {
        if !self.is_client_error() {
            return GENERIC_MESSAGE.to_string();
        }

        match self {
            AppError::Domain(e) => format!("❌ {e}"),
            AppError::Authorization(_) => {
                "❌ You do not have permission to use this command.".to_string()
            }
            AppError::Deserialization(_) => "❌ Could not understand that request.".to_string(),
            AppError::Validation(msg) | AppError::NotFound(msg) => format!("❌ {msg}"),
            _ => GENERIC_MESSAGE.to_string(),
        }
    }

    /// 重要度に応じたレベルでログに記録
    pub fn log(&self) {
        let metadata = self.metadata();

        match metadata.severity {
            ErrorSeverity::Critical => tracing::error!(
                error = %self,
                code = metadata.code,
                category = ?metadata.category,
                "Critical error occurred"
            ),
            ErrorSeverity::Error => tracing::error!(
                error = %self,
                code = metadata.code,
                category = ?metadata.category,
                "Error occurred"
            ),
            ErrorSeverity::Warning => tracing::warn!(
                error = %self,
                code = metadata.code,
                category = ?metadata.category,
                "Warning occurred"
            ),
            ErrorSeverity::Info => tracing::info!(
                error = %self,
                code = metadata.code,
                category = ?metadata.category,
                "Request rejected"
            ),
        }
    }
}

/// 対象が見つからないエラーは NotFound、それ以外はドメインエラーとして扱う
impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::TaskNotFound(_) => AppError::NotFound(e.to_string()),
            e => AppError::Domain(e),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Deserialization(e.to_string())
    }
}
