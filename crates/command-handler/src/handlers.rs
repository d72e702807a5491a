use crate::commands::{
    target_date, AttendanceEditCommand, DeleteTaskCommand, EditTaskCommand, SetTaskStatusCommand,
    SubmitTasksCommand,
};
use chrono::NaiveDateTime;
use domain::{
    parse_date, parse_submission, AttendanceBook, AttendanceStatus, PunchInWindow, TaskBook,
    TaskStatus,
};
use infrastructure::RecordStores;
use shared::{AppError, Invoker, Reply};
use tracing::info;

/// 状態を変更するコマンドを処理する
#[derive(Clone)]
pub struct CommandHandler {
    stores: RecordStores,
    punch_in_window: PunchInWindow,
}

impl CommandHandler {
    pub fn new(stores: RecordStores, punch_in_window: PunchInWindow) -> Self {
        Self {
            stores,
            punch_in_window,
        }
    }

    /// 出勤打刻
    pub async fn punch_in(&self, invoker: &Invoker, now: NaiveDateTime) -> Result<Reply, AppError> {
        let window = self.punch_in_window;
        let date = self
            .stores
            .attendance
            .update(|book: &mut AttendanceBook| {
                book.punch_in(&invoker.id, now, &window)
                    .map_err(AppError::from)
            })
            .await?;

        info!(user_id = %invoker.id, %date, "Punch-in recorded");

        Ok(Reply::message("✅ Punch-in recorded successfully!").with_audit(format!(
            "🟢 {} punched in at {}",
            invoker.display_name,
            now.format("%H:%M:%S")
        )))
    }

    /// 管理者による出勤記録の上書き
    pub async fn edit_attendance(
        &self,
        invoker: &Invoker,
        command: AttendanceEditCommand,
    ) -> Result<Reply, AppError> {
        invoker.require_admin()?;

        let date = parse_date(&command.date)?;
        let status = AttendanceStatus::from_string(&command.status)?;
        let user = command.user;

        let previous = self
            .stores
            .attendance
            .update(|book: &mut AttendanceBook| -> Result<_, AppError> {
                Ok(book.set_status(user.id.clone(), date, status))
            })
            .await?;

        info!(
            admin_id = %invoker.id,
            user_id = %user.id,
            %date,
            status = status.as_str(),
            previous = ?previous,
            "Attendance edited"
        );

        Ok(Reply::message(format!(
            "✅ Updated {}'s attendance on {} to {}",
            user.display_name, date, status
        ))
        .with_audit(format!(
            "🛠️ {} set {}'s attendance on {} to {}",
            invoker.display_name, user.display_name, date, status
        )))
    }

    /// 当日分のタスク提出
    pub async fn submit_tasks(
        &self,
        invoker: &Invoker,
        command: SubmitTasksCommand,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let tasks = parse_submission(&command.text)?;
        let today = now.date();

        let submitted = self
            .stores
            .tasks
            .update(|book: &mut TaskBook| {
                book.submit(&invoker.id, today, tasks)
                    .map(|tasks| tasks.to_vec())
                    .map_err(AppError::from)
            })
            .await?;

        info!(user_id = %invoker.id, date = %today, count = submitted.len(), "Tasks submitted");

        let lines = submitted
            .iter()
            .enumerate()
            .map(|(i, task)| format!("{}. {} ({})", i + 1, task.description, task.duration))
            .collect::<Vec<_>>()
            .join("\n");

        Ok(Reply::message(format!(
            "✅ Submitted {} task(s) for {}:\n{}",
            submitted.len(),
            today,
            lines
        ))
        .with_audit(format!(
            "📝 {} submitted {} task(s) for {}",
            invoker.display_name,
            submitted.len(),
            today
        )))
    }

    /// タスクの説明と作業時間を置き換える
    pub async fn edit_task(
        &self,
        invoker: &Invoker,
        command: EditTaskCommand,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let date = target_date(command.date.as_deref(), now.date())?;

        let change = self
            .stores
            .tasks
            .update(|book: &mut TaskBook| {
                book.edit(
                    &invoker.id,
                    date,
                    &command.task,
                    &command.description,
                    &command.duration,
                )
                .map_err(AppError::from)
            })
            .await?;

        info!(user_id = %invoker.id, %date, task_id = %change.after.id, "Task edited");

        let diff = format!(
            "- Before: **{}** ({})\n- After: **{}** ({})",
            change.before.description,
            change.before.duration,
            change.after.description,
            change.after.duration
        );

        Ok(Reply::message(format!("✅ Task updated:\n{diff}")).with_audit(format!(
            "✏️ {} edited a task:\n{diff}",
            invoker.display_name
        )))
    }

    pub async fn delete_task(
        &self,
        invoker: &Invoker,
        command: DeleteTaskCommand,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let date = target_date(command.date.as_deref(), now.date())?;

        let removed = self
            .stores
            .tasks
            .update(|book: &mut TaskBook| {
                book.remove(&invoker.id, date, &command.task)
                    .map_err(AppError::from)
            })
            .await?;

        info!(user_id = %invoker.id, %date, task_id = %removed.id, "Task deleted");

        Ok(Reply::message(format!(
            "🗑️ Deleted task: **{}** ({})",
            removed.description, removed.duration
        ))
        .with_audit(format!(
            "🗑️ {} deleted a task: **{}** ({})",
            invoker.display_name, removed.description, removed.duration
        )))
    }

    /// タスクの進捗ステータスを変更
    pub async fn set_task_status(
        &self,
        invoker: &Invoker,
        command: SetTaskStatusCommand,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let date = target_date(command.date.as_deref(), now.date())?;
        let status = TaskStatus::from_string(&command.status)?;

        let change = self
            .stores
            .tasks
            .update(|book: &mut TaskBook| {
                book.set_status(&invoker.id, date, &command.task, status)
                    .map_err(AppError::from)
            })
            .await?;

        info!(
            user_id = %invoker.id,
            %date,
            task_id = %change.after.id,
            from = change.before.status.as_str(),
            to = status.as_str(),
            "Task status changed"
        );

        Ok(Reply::message(format!(
            "✅ **{}** is now {}",
            change.after.description, status
        ))
        .with_audit(format!(
            "📌 {} marked **{}** as {}",
            invoker.display_name, change.after.description, status
        )))
    }
}
