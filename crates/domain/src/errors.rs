use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Invalid UserId: {0}")]
    InvalidUserId(String),

    #[error("Invalid TaskId: {0}")]
    InvalidTaskId(String),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid status: {0}. Use Present, Half-Day, or Absent.")]
    InvalidAttendanceStatus(String),

    #[error("Invalid task status: {0}. Use pending, done, or not-done.")]
    InvalidTaskStatus(String),

    #[error("Invalid punch-in window: {0}")]
    InvalidPunchInWindow(String),

    // 出勤打刻
    #[error("Punch-in is only allowed between {start}–{end}.")]
    OutsidePunchInWindow { start: String, end: String },

    #[error("You have already punched in today.")]
    AlreadyPunchedIn,

    // タスク
    #[error("Task line has no duration (e.g. \"2h\", \"30 min\"): {0}")]
    MissingDuration(String),

    #[error("Task line has no description: {0}")]
    MissingDescription(String),

    #[error("Task submission is empty")]
    EmptySubmission,

    #[error("Tasks for {0} were already submitted")]
    DuplicateSubmission(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),
}
