use domain::{parse_date, DateRange, DomainError};
use serde::Deserialize;
use shared::{Member, Role};

/// 個人の出勤集計。ユーザー未指定なら実行者
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceQuery {
    #[serde(default)]
    pub user: Option<Member>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl AttendanceQuery {
    pub fn range(&self) -> Result<DateRange, DomainError> {
        date_range(self.from.as_deref(), self.to.as_deref())
    }
}

/// ロール単位の出勤集計
#[derive(Debug, Clone, Deserialize)]
pub struct TeamAttendanceQuery {
    pub role: Role,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

impl TeamAttendanceQuery {
    pub fn range(&self) -> Result<DateRange, DomainError> {
        date_range(self.from.as_deref(), self.to.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    #[serde(default)]
    pub user: Option<Member>,
}

/// ユーザーかロールのどちらかを指定する
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskViewQuery {
    #[serde(default)]
    pub user: Option<Member>,
    #[serde(default)]
    pub role: Option<Role>,
}

/// 表示名の解決に使うメンバー一覧はアダプターが渡す
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub members: Vec<Member>,
}

fn date_range(from: Option<&str>, to: Option<&str>) -> Result<DateRange, DomainError> {
    DateRange::new(
        from.map(parse_date).transpose()?,
        to.map(parse_date).transpose()?,
    )
}
