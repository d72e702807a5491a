use crate::errors::AppError;
use domain::UserId;
use serde::{Deserialize, Serialize};

/// ギルドのメンバー（表示名はアダプター側で解決済み）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub display_name: String,
}

/// コマンドを実行したユーザー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoker {
    pub id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Invoker {
    pub fn member(&self) -> Member {
        Member {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
        }
    }

    /// 管理者専用コマンドの権限チェック
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "user {} is not an administrator",
                self.id
            )))
        }
    }
}

/// ロール（チーム）とそのメンバー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
}
