use chrono::NaiveDateTime;
use command_handler::{
    AttendanceEditCommand, CommandHandler, DeleteTaskCommand, EditTaskCommand,
    SetTaskStatusCommand, SubmitTasksCommand,
};
use domain::PunchInWindow;
use infrastructure::RecordStores;
use query_handler::{
    AttendanceQuery, CalendarQuery, LogsQuery, QueryHandler, TaskViewQuery, TeamAttendanceQuery,
};
use serde::Deserialize;
use shared::{telemetry::InteractionTraceContext, trace_interaction, AppError, Invoker, Reply};
use tracing::warn;

/// アダプターから届く1件のインタラクション
#[derive(Debug, Deserialize)]
pub struct Interaction {
    pub invoker: Invoker,
    #[serde(flatten)]
    pub request: Request,
}

/// コマンド名とそのオプション
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    Attendance(AttendanceQuery),
    AttendanceTeam(TeamAttendanceQuery),
    AttendanceEdit(AttendanceEditCommand),
    Calendar(CalendarQuery),
    PunchIn,
    TaskSubmit(SubmitTasksCommand),
    Task,
    TaskView(TaskViewQuery),
    TaskEdit(EditTaskCommand),
    TaskDelete(DeleteTaskCommand),
    TaskStatus(SetTaskStatusCommand),
    Logs(LogsQuery),
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Attendance(_) => "attendance",
            Request::AttendanceTeam(_) => "attendance_team",
            Request::AttendanceEdit(_) => "attendance_edit",
            Request::Calendar(_) => "calendar",
            Request::PunchIn => "punch_in",
            Request::TaskSubmit(_) => "task_submit",
            Request::Task => "task",
            Request::TaskView(_) => "task_view",
            Request::TaskEdit(_) => "task_edit",
            Request::TaskDelete(_) => "task_delete",
            Request::TaskStatus(_) => "task_status",
            Request::Logs(_) => "logs",
        }
    }
}

/// インタラクションを各ハンドラーに振り分ける
#[derive(Clone)]
pub struct Dispatcher {
    commands: CommandHandler,
    queries: QueryHandler,
}

impl Dispatcher {
    pub fn new(stores: RecordStores, punch_in_window: PunchInWindow) -> Self {
        Self {
            commands: CommandHandler::new(stores.clone(), punch_in_window),
            queries: QueryHandler::new(stores),
        }
    }

    /// 1行分のJSONを処理して返信を作る。エラーも返信として表現する
    pub async fn handle_line(&self, line: &str, now: NaiveDateTime) -> Reply {
        let interaction: Interaction = match serde_json::from_str(line) {
            Ok(interaction) => interaction,
            Err(e) => {
                warn!(error = %e, "Malformed interaction");
                return Reply::from_error(&AppError::from(e));
            }
        };

        let trace_context =
            InteractionTraceContext::new(interaction.request.name(), interaction.invoker.id.as_str());

        let result = trace_interaction!(trace_context, self.dispatch(interaction, now));

        result.unwrap_or_else(|e| {
            e.log();
            Reply::from_error(&e)
        })
    }

    pub async fn dispatch(
        &self,
        interaction: Interaction,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let Interaction { invoker, request } = interaction;

        match request {
            Request::Attendance(query) => self.queries.attendance_summary(&invoker, query, now).await,
            Request::AttendanceTeam(query) => self.queries.team_attendance(query, now).await,
            Request::AttendanceEdit(command) => {
                self.commands.edit_attendance(&invoker, command).await
            }
            Request::Calendar(query) => self.queries.calendar(&invoker, query, now).await,
            Request::PunchIn => self.commands.punch_in(&invoker, now).await,
            Request::TaskSubmit(command) => self.commands.submit_tasks(&invoker, command, now).await,
            Request::Task => self.queries.task_list(&invoker, now).await,
            Request::TaskView(query) => self.queries.task_view(query, now).await,
            Request::TaskEdit(command) => self.commands.edit_task(&invoker, command, now).await,
            Request::TaskDelete(command) => self.commands.delete_task(&invoker, command, now).await,
            Request::TaskStatus(command) => {
                self.commands.set_task_status(&invoker, command, now).await
            }
            Request::Logs(query) => self.queries.logs(&invoker, query, now).await,
        }
    }
}
