use crate::errors::DomainError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// ドキュメント上の日付キーの書式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// チャットプラットフォームのユーザーID
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// 文字列からユーザーIDを作成
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidUserId(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::from_string(id)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// タスクID（ULID）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// 新しいタスクIDを生成
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// 文字列からタスクIDを作成
    pub fn from_string(id: String) -> Result<Self, DomainError> {
        ulid::Ulid::from_string(id.trim())
            .map(|ulid| Self(ulid.to_string()))
            .map_err(|e| DomainError::InvalidTaskId(format!("{id}: {e}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `YYYY-MM-DD` 形式の日付をパース
pub fn parse_date(value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DomainError::InvalidDate(value.to_string()))
}
