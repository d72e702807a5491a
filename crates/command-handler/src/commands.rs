use chrono::NaiveDate;
use domain::{parse_date, DomainError, TaskSelector};
use serde::Deserialize;
use shared::Member;

/// 管理者による出勤記録の修正
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceEditCommand {
    pub user: Member,
    pub date: String,
    pub status: String,
}

/// 1日分のタスク提出（1行1タスク）
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTasksCommand {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditTaskCommand {
    pub task: TaskSelector,
    pub description: String,
    pub duration: String,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTaskCommand {
    pub task: TaskSelector,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetTaskStatusCommand {
    pub task: TaskSelector,
    pub status: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// 日付指定がなければ当日
pub(crate) fn target_date(date: Option<&str>, today: NaiveDate) -> Result<NaiveDate, DomainError> {
    date.map_or(Ok(today), parse_date)
}
