use chrono::{NaiveDate, NaiveDateTime};
use domain::{AttendanceBook, AttendanceStatus, Task, TaskBook, UserId};
use infrastructure::RecordStores;
use query_handler::{
    AttendanceQuery, CalendarQuery, LogsQuery, QueryHandler, TaskViewQuery, TeamAttendanceQuery,
    CALENDAR_DAYS,
};
use shared::{AppError, EmbedColor, Invoker, Member, Reply, Role};
use tempfile::TempDir;

fn user(id: &str) -> UserId {
    UserId::from_string(id.to_string()).unwrap()
}

fn member(id: &str, name: &str) -> Member {
    Member {
        id: user(id),
        display_name: name.to_string(),
    }
}

fn invoker(id: &str, name: &str, is_admin: bool) -> Invoker {
    Invoker {
        id: user(id),
        display_name: name.to_string(),
        is_admin,
    }
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
}

fn now() -> NaiveDateTime {
    date(20).and_hms_opt(12, 0, 0).unwrap()
}

fn field<'a>(reply: &'a Reply, name: &str) -> &'a str {
    reply
        .embed
        .as_ref()
        .unwrap()
        .fields
        .iter()
        .find(|f| f.name == name)
        .map(|f| f.value.as_str())
        .unwrap()
}

async fn setup(attendance: AttendanceBook, tasks: TaskBook) -> (TempDir, QueryHandler) {
    let dir = TempDir::new().unwrap();
    let stores = RecordStores::in_dir(dir.path());
    stores.attendance.save(&attendance).await.unwrap();
    stores.tasks.save(&tasks).await.unwrap();
    (dir, QueryHandler::new(stores))
}

fn sample_attendance() -> AttendanceBook {
    let mut book = AttendanceBook::new();
    book.set_status(user("1"), date(1), AttendanceStatus::Present);
    book.set_status(user("1"), date(2), AttendanceStatus::HalfDay);
    book.set_status(user("1"), date(19), AttendanceStatus::Present);
    book.set_status(user("2"), date(1), AttendanceStatus::Absent);
    book.set_status(user("2"), date(2), AttendanceStatus::Present);
    book
}

fn sample_tasks() -> TaskBook {
    let mut book = TaskBook::new();
    book.submit(
        &user("1"),
        date(20),
        vec![
            Task::new("Fix bug", "2h").unwrap(),
            Task::new("Review", "30m").unwrap(),
        ],
    )
    .unwrap();
    book.submit(&user("2"), date(20), vec![Task::new("Deploy", "1h").unwrap()])
        .unwrap();
    book
}

#[tokio::test]
async fn test_attendance_summary_defaults_to_invoker() {
    let (_dir, handler) = setup(sample_attendance(), TaskBook::new()).await;

    let reply = handler
        .attendance_summary(&invoker("1", "Ann", false), AttendanceQuery::default(), now())
        .await
        .unwrap();

    let embed = reply.embed.as_ref().unwrap();
    assert_eq!(embed.title, "📅 Attendance Summary for Ann");
    assert_eq!(embed.color, EmbedColor::Green);
    assert_eq!(field(&reply, "✅ Present"), "2");
    assert_eq!(field(&reply, "🌓 Half-Day"), "1");
    assert_eq!(field(&reply, "❌ Absent"), "0");
}

#[tokio::test]
async fn test_attendance_summary_with_range() {
    let (_dir, handler) = setup(sample_attendance(), TaskBook::new()).await;
    let query = AttendanceQuery {
        user: Some(member("1", "Ann")),
        from: Some("2024-05-02".to_string()),
        to: Some("2024-05-31".to_string()),
    };

    let reply = handler
        .attendance_summary(&invoker("9", "Admin", true), query, now())
        .await
        .unwrap();

    assert_eq!(field(&reply, "✅ Present"), "1");
    assert_eq!(field(&reply, "🌓 Half-Day"), "1");
    assert_eq!(
        reply.embed.unwrap().description.as_deref(),
        Some("2024-05-02 to 2024-05-31")
    );
}

#[tokio::test]
async fn test_team_attendance_sums_members() {
    let (_dir, handler) = setup(sample_attendance(), TaskBook::new()).await;
    let query = TeamAttendanceQuery {
        role: Role {
            name: "Backend".to_string(),
            members: vec![member("1", "Ann"), member("2", "Bob"), member("3", "Cy")],
        },
        from: None,
        to: None,
    };

    let reply = handler.team_attendance(query, now()).await.unwrap();

    assert_eq!(
        reply.embed.as_ref().unwrap().title,
        "👥 Team Attendance Summary (Backend)"
    );
    assert_eq!(field(&reply, "✅ Present"), "3");
    assert_eq!(field(&reply, "🌓 Half-Day"), "1");
    assert_eq!(field(&reply, "❌ Absent"), "1");
}

#[tokio::test]
async fn test_calendar_covers_last_thirty_days() {
    let (_dir, handler) = setup(sample_attendance(), TaskBook::new()).await;

    let reply = handler
        .calendar(&invoker("1", "Ann", false), CalendarQuery::default(), now())
        .await
        .unwrap();

    assert_eq!(reply.content.as_deref(), Some("📊 Attendance calendar for Ann"));
    let chart = reply.calendar.unwrap();
    assert_eq!(chart.title, "Attendance Heatmap - Ann");
    assert_eq!(chart.days.len(), CALENDAR_DAYS as usize);
    assert_eq!(chart.days.last().unwrap().date, date(20));
    assert_eq!(chart.days.last().unwrap().level, 0);

    let day_19 = chart.days.iter().find(|d| d.date == date(19)).unwrap();
    assert_eq!(day_19.level, 2);
}

#[tokio::test]
async fn test_calendar_without_records_is_empty_result() {
    let (_dir, handler) = setup(sample_attendance(), TaskBook::new()).await;
    let query = CalendarQuery {
        user: Some(member("7", "Dee")),
    };

    let reply = handler
        .calendar(&invoker("1", "Ann", false), query, now())
        .await
        .unwrap();

    assert_eq!(
        reply.content.as_deref(),
        Some("❌ No attendance records found for Dee.")
    );
    assert!(reply.calendar.is_none());
}

#[tokio::test]
async fn test_task_list_for_today() {
    let (_dir, handler) = setup(AttendanceBook::new(), sample_tasks()).await;

    let reply = handler
        .task_list(&invoker("1", "Ann", false), now())
        .await
        .unwrap();

    let embed = reply.embed.as_ref().unwrap();
    assert_eq!(embed.title, "Ann's Tasks (2024-05-20)");
    assert_eq!(embed.fields.len(), 2);
    assert!(field(&reply, "Task 2").starts_with("Review (30m) [pending]"));

    let empty = handler
        .task_list(&invoker("3", "Cy", false), now())
        .await
        .unwrap();
    assert_eq!(empty.content.as_deref(), Some("❌ No tasks for today."));
}

#[tokio::test]
async fn test_task_view_by_user_and_role() {
    let (_dir, handler) = setup(AttendanceBook::new(), sample_tasks()).await;

    let by_user = handler
        .task_view(
            TaskViewQuery {
                user: Some(member("2", "Bob")),
                role: None,
            },
            now(),
        )
        .await
        .unwrap();
    assert_eq!(field(&by_user, "Task 1"), "Deploy (1h)");

    let by_role = handler
        .task_view(
            TaskViewQuery {
                user: None,
                role: Some(Role {
                    name: "Backend".to_string(),
                    members: vec![member("1", "Ann"), member("3", "Cy")],
                }),
            },
            now(),
        )
        .await
        .unwrap();
    let embed = by_role.embed.as_ref().unwrap();
    assert_eq!(embed.color, EmbedColor::Purple);
    assert_eq!(embed.fields.len(), 1);
    assert_eq!(field(&by_role, "Ann"), "- Fix bug (2h)\n- Review (30m)");
}

#[tokio::test]
async fn test_task_view_empty_results() {
    let (_dir, handler) = setup(AttendanceBook::new(), sample_tasks()).await;

    let no_user_tasks = handler
        .task_view(
            TaskViewQuery {
                user: Some(member("3", "Cy")),
                role: None,
            },
            now(),
        )
        .await
        .unwrap();
    assert_eq!(no_user_tasks.content.as_deref(), Some("❌ No tasks for Cy."));

    let no_role_tasks = handler
        .task_view(
            TaskViewQuery {
                user: None,
                role: Some(Role {
                    name: "Design".to_string(),
                    members: vec![member("3", "Cy")],
                }),
            },
            now(),
        )
        .await
        .unwrap();
    assert_eq!(
        no_role_tasks.content.as_deref(),
        Some("❌ No tasks found for role Design.")
    );
}

#[tokio::test]
async fn test_task_view_requires_user_or_role() {
    let (_dir, handler) = setup(AttendanceBook::new(), TaskBook::new()).await;

    let error = handler
        .task_view(TaskViewQuery::default(), now())
        .await
        .unwrap_err();

    assert_eq!(
        error.user_message(),
        "❌ Please provide either a user or a role."
    );
}

#[tokio::test]
async fn test_logs_requires_admin() {
    let (_dir, handler) = setup(AttendanceBook::new(), TaskBook::new()).await;

    let error = handler
        .logs(&invoker("1", "Ann", false), LogsQuery::default(), now())
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Authorization(_)));
}

#[tokio::test]
async fn test_logs_on_empty_documents() {
    let (_dir, handler) = setup(AttendanceBook::new(), TaskBook::new()).await;

    let reply = handler
        .logs(&invoker("9", "Admin", true), LogsQuery::default(), now())
        .await
        .unwrap();

    let embed = reply.embed.as_ref().unwrap();
    assert_eq!(embed.title, "📜 Bot Logs");
    assert_eq!(embed.color, EmbedColor::Gold);
    assert_eq!(field(&reply, "📝 Tasks"), "No tasks logged.");
    assert_eq!(field(&reply, "📅 Attendance"), "No attendance logged.");
}

#[tokio::test]
async fn test_logs_show_last_five_entries_with_name_fallback() {
    let mut attendance = sample_attendance();
    attendance.set_status(user("3"), date(3), AttendanceStatus::Absent);
    let (_dir, handler) = setup(attendance, sample_tasks()).await;
    let query = LogsQuery {
        members: vec![member("1", "Ann")],
    };

    let reply = handler
        .logs(&invoker("9", "Admin", true), query, now())
        .await
        .unwrap();

    assert_eq!(
        field(&reply, "📅 Attendance"),
        [
            "📅 User(2): Absent on 2024-05-01",
            "📅 Ann: Half-Day on 2024-05-02",
            "📅 User(2): Present on 2024-05-02",
            "📅 User(3): Absent on 2024-05-03",
            "📅 Ann: Present on 2024-05-19",
        ]
        .join("\n")
    );
    assert_eq!(
        field(&reply, "📝 Tasks"),
        [
            "📝 Ann: Fix bug (2h) on 2024-05-20",
            "📝 Ann: Review (30m) on 2024-05-20",
            "📝 User(2): Deploy (1h) on 2024-05-20",
        ]
        .join("\n")
    );
}
