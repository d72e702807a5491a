use crate::queries::{AttendanceQuery, CalendarQuery, LogsQuery, TaskViewQuery, TeamAttendanceQuery};
use chrono::NaiveDateTime;
use domain::{AttendanceSummary, DateRange, Task, UserId};
use infrastructure::RecordStores;
use shared::{AppError, CalendarChart, Embed, EmbedColor, Invoker, Member, Reply};
use std::collections::HashMap;
use tracing::{debug, info};

/// カレンダーに表示する日数
pub const CALENDAR_DAYS: u32 = 30;

/// ログ表示で各セクションに出す件数
pub const RECENT_LOG_ENTRIES: usize = 5;

/// 読み取り専用の問い合わせを処理する
#[derive(Clone)]
pub struct QueryHandler {
    stores: RecordStores,
}

impl QueryHandler {
    pub fn new(stores: RecordStores) -> Self {
        Self { stores }
    }

    /// 個人の出勤集計
    pub async fn attendance_summary(
        &self,
        invoker: &Invoker,
        query: AttendanceQuery,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let range = query.range()?;
        let user = query.user.unwrap_or_else(|| invoker.member());

        let book = self.stores.attendance.load().await?;
        let summary = book.summary(&user.id, &range);

        debug!(user_id = %user.id, total = summary.total(), "Attendance summarized");

        let embed = summary_fields(
            Embed::new(
                format!("📅 Attendance Summary for {}", user.display_name),
                EmbedColor::Green,
            ),
            &summary,
        );
        Ok(Reply::embed(with_range(embed, &range).timestamp(now)))
    }

    /// ロールのメンバー全員の出勤集計の合計
    pub async fn team_attendance(
        &self,
        query: TeamAttendanceQuery,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let range = query.range()?;
        let role = query.role;

        let book = self.stores.attendance.load().await?;
        let summary = book.team_summary(role.members.iter().map(|m| &m.id), &range);

        debug!(
            role = %role.name,
            members = role.members.len(),
            total = summary.total(),
            "Team attendance summarized"
        );

        let embed = summary_fields(
            Embed::new(
                format!("👥 Team Attendance Summary ({})", role.name),
                EmbedColor::Blue,
            ),
            &summary,
        );
        Ok(Reply::embed(with_range(embed, &range).timestamp(now)))
    }

    /// 直近30日の出勤カレンダー
    pub async fn calendar(
        &self,
        invoker: &Invoker,
        query: CalendarQuery,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        let user = query.user.unwrap_or_else(|| invoker.member());
        let book = self.stores.attendance.load().await?;

        if book.records_for(&user.id).map_or(true, |records| records.is_empty()) {
            return Ok(Reply::message(format!(
                "❌ No attendance records found for {}.",
                user.display_name
            )));
        }

        let days = book.calendar(&user.id, now.date(), CALENDAR_DAYS);
        Ok(Reply::calendar(
            format!("📊 Attendance calendar for {}", user.display_name),
            CalendarChart {
                title: format!("Attendance Heatmap - {}", user.display_name),
                days,
            },
        ))
    }

    /// 実行者の当日のタスク一覧
    pub async fn task_list(&self, invoker: &Invoker, now: NaiveDateTime) -> Result<Reply, AppError> {
        let today = now.date();
        let book = self.stores.tasks.load().await?;
        let tasks = book.tasks_on(&invoker.id, today);

        if tasks.is_empty() {
            return Ok(Reply::message("❌ No tasks for today."));
        }

        let embed = tasks.iter().enumerate().fold(
            Embed::new(
                format!("{}'s Tasks ({})", invoker.display_name, today),
                EmbedColor::Blue,
            ),
            |embed, (i, task)| {
                embed.field(
                    format!("Task {}", i + 1),
                    format!(
                        "{} [{}]\nid: {}",
                        task_label(task),
                        task.status,
                        task.id
                    ),
                    false,
                )
            },
        );
        Ok(Reply::embed(embed))
    }

    /// 指定ユーザー、またはロールの各メンバーの当日のタスク
    pub async fn task_view(&self, query: TaskViewQuery, now: NaiveDateTime) -> Result<Reply, AppError> {
        let today = now.date();

        match (query.user, query.role) {
            (Some(user), _) => {
                let book = self.stores.tasks.load().await?;
                let tasks = book.tasks_on(&user.id, today);
                if tasks.is_empty() {
                    return Ok(Reply::message(format!(
                        "❌ No tasks for {}.",
                        user.display_name
                    )));
                }

                let embed = tasks.iter().enumerate().fold(
                    Embed::new(
                        format!("Tasks for {} ({})", user.display_name, today),
                        EmbedColor::Green,
                    ),
                    |embed, (i, task)| embed.field(format!("Task {}", i + 1), task_label(task), false),
                );
                Ok(Reply::embed(embed))
            }
            (None, Some(role)) => {
                let book = self.stores.tasks.load().await?;
                let mut embed = Embed::new(
                    format!("Tasks for {} ({})", role.name, today),
                    EmbedColor::Purple,
                );

                for member in &role.members {
                    let tasks = book.tasks_on(&member.id, today);
                    if tasks.is_empty() {
                        continue;
                    }
                    let lines = tasks
                        .iter()
                        .map(|task| format!("- {}", task_label(task)))
                        .collect::<Vec<_>>()
                        .join("\n");
                    embed = embed.field(member.display_name.clone(), lines, false);
                }

                if embed.fields.is_empty() {
                    return Ok(Reply::message(format!(
                        "❌ No tasks found for role {}.",
                        role.name
                    )));
                }
                Ok(Reply::embed(embed))
            }
            (None, None) => Err(AppError::Validation(
                "Please provide either a user or a role.".to_string(),
            )),
        }
    }

    /// 最近のタスクと出勤の記録（管理者専用）
    pub async fn logs(
        &self,
        invoker: &Invoker,
        query: LogsQuery,
        now: NaiveDateTime,
    ) -> Result<Reply, AppError> {
        invoker.require_admin()?;

        let tasks = self.stores.tasks.load().await?;
        let attendance = self.stores.attendance.load().await?;
        let names = DisplayNames::new(invoker, &query.members);

        let task_lines = recent(
            tasks.entries().collect::<Vec<_>>(),
            |(user_id, date, _)| (*date, *user_id),
            |(user_id, date, task)| {
                format!("📝 {}: {} on {}", names.get(user_id), task_label(task), date)
            },
        );
        let attendance_lines = recent(
            attendance.entries().collect::<Vec<_>>(),
            |(user_id, date, _)| (*date, *user_id),
            |(user_id, date, status)| format!("📅 {}: {} on {}", names.get(user_id), status, date),
        );

        info!(
            admin_id = %invoker.id,
            tasks = task_lines.len(),
            attendance = attendance_lines.len(),
            "Logs viewed"
        );

        let embed = Embed::new("📜 Bot Logs", EmbedColor::Gold)
            .description("Here are the latest activity logs.")
            .field("📝 Tasks", or_placeholder(task_lines, "No tasks logged."), false)
            .field(
                "📅 Attendance",
                or_placeholder(attendance_lines, "No attendance logged."),
                false,
            )
            .timestamp(now);
        Ok(Reply::embed(embed))
    }
}

fn summary_fields(embed: Embed, summary: &AttendanceSummary) -> Embed {
    embed
        .field("✅ Present", summary.present.to_string(), true)
        .field("🌓 Half-Day", summary.half_day.to_string(), true)
        .field("❌ Absent", summary.absent.to_string(), true)
}

fn with_range(embed: Embed, range: &DateRange) -> Embed {
    if range.is_unbounded() {
        embed
    } else {
        embed.description(range.to_string())
    }
}

fn task_label(task: &Task) -> String {
    format!("{} ({})", task.description, task.duration)
}

/// 日付順、同日はユーザーID順、同一ユーザーは登録順に並べた末尾の数件
fn recent<T, K: Ord>(
    mut entries: Vec<T>,
    key: impl Fn(&T) -> K,
    render: impl Fn(&T) -> String,
) -> Vec<String> {
    entries.sort_by_key(|entry| key(entry));

    let skip = entries.len().saturating_sub(RECENT_LOG_ENTRIES);
    entries.iter().skip(skip).map(render).collect()
}

fn or_placeholder(lines: Vec<String>, placeholder: &str) -> String {
    if lines.is_empty() {
        placeholder.to_string()
    } else {
        lines.join("\n")
    }
}

/// ユーザーIDから表示名を引く。不明なユーザーは `User(<id>)`
struct DisplayNames<'a> {
    names: HashMap<&'a UserId, &'a str>,
}

impl<'a> DisplayNames<'a> {
    fn new(invoker: &'a Invoker, members: &'a [Member]) -> Self {
        let mut names: HashMap<&UserId, &str> = members
            .iter()
            .map(|m| (&m.id, m.display_name.as_str()))
            .collect();
        names
            .entry(&invoker.id)
            .or_insert(invoker.display_name.as_str());
        Self { names }
    }

    fn get(&self, user_id: &UserId) -> String {
        self.names
            .get(user_id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| format!("User({user_id})"))
    }
}
