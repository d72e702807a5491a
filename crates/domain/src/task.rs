use crate::errors::DomainError;
use crate::identifiers::{TaskId, UserId};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 作業時間の表記（"2h", "1.5 hours", "30 min", "1h 30m" など）
static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b\d+(?:\.\d+)?\s*(?:hours?|hrs?|h|minutes?|mins?|m)(?:\s*\d+\s*(?:minutes?|mins?|m))?\b",
    )
    .expect("valid duration regex")
});

/// 行頭の箇条書き記号
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s+").expect("valid bullet regex"));

const SEPARATORS: &[char] = &['-', '–', '—', ':', '|', ',', '(', ')', '[', ']'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
    NotDone,
}

impl TaskStatus {
    pub fn from_string(status: &str) -> Result<Self, DomainError> {
        match status.trim().to_lowercase().replace('_', "-").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            "not-done" | "notdone" => Ok(TaskStatus::NotDone),
            _ => Err(DomainError::InvalidTaskStatus(status.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
            TaskStatus::NotDone => "not-done",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 1件のタスク
///
/// 既存ドキュメントとの互換のため、説明は `task`、作業時間は `time` として保存する。
/// `id` / `status` を持たない古いエントリは読み込み時に補完される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    #[serde(rename = "task", alias = "description")]
    pub description: String,
    #[serde(rename = "time", alias = "duration")]
    pub duration: String,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// 新しいタスクを作成（作業時間の表記が必須）
    pub fn new(description: &str, duration: &str) -> Result<Self, DomainError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(DomainError::MissingDescription(duration.trim().to_string()));
        }

        Ok(Self {
            id: TaskId::new(),
            description: description.to_string(),
            duration: validate_duration(duration)?,
            status: TaskStatus::Pending,
        })
    }

    /// "Fix login bug - 2 hours" のような1行をパース
    pub fn parse_line(line: &str) -> Result<Self, DomainError> {
        let line = BULLET_RE.replace(line.trim(), "");
        let found = DURATION_RE
            .find(&line)
            .ok_or_else(|| DomainError::MissingDuration(line.to_string()))?;

        let rest = format!("{} {}", &line[..found.start()], &line[found.end()..]);
        let description = rest
            .trim()
            .trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if description.is_empty() {
            return Err(DomainError::MissingDescription(line.to_string()));
        }

        Task::new(&description, found.as_str())
    }
}

/// 作業時間の表記を検証して正規化（前後の空白を除去）
fn validate_duration(duration: &str) -> Result<String, DomainError> {
    let duration = duration.trim();
    if DURATION_RE.is_match(duration) {
        Ok(duration.to_string())
    } else {
        Err(DomainError::MissingDuration(duration.to_string()))
    }
}

/// 複数行の提出内容をパース。1行でも不正なら全体を拒否する
pub fn parse_submission(text: &str) -> Result<Vec<Task>, DomainError> {
    let tasks = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(Task::parse_line)
        .collect::<Result<Vec<_>, _>>()?;

    if tasks.is_empty() {
        return Err(DomainError::EmptySubmission);
    }
    Ok(tasks)
}

/// タスクの指定方法: 表示上の番号（1始まり）または安定ID
///
/// JSONでは数値 `2`、文字列 `"2"` / `"#2"`、またはIDの文字列を受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SelectorInput")]
pub enum TaskSelector {
    Position(usize),
    Id(TaskId),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectorInput {
    Number(usize),
    Text(String),
}

impl TryFrom<SelectorInput> for TaskSelector {
    type Error = DomainError;

    fn try_from(input: SelectorInput) -> Result<Self, Self::Error> {
        match input {
            SelectorInput::Number(position) => Ok(TaskSelector::Position(position)),
            SelectorInput::Text(text) => TaskSelector::parse(&text),
        }
    }
}

impl TaskSelector {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let value = value.trim().trim_start_matches('#');
        match value.parse::<usize>() {
            Ok(position) => Ok(TaskSelector::Position(position)),
            Err(_) => TaskId::from_string(value.to_string()).map(TaskSelector::Id),
        }
    }
}

impl std::fmt::Display for TaskSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskSelector::Position(position) => write!(f, "#{position}"),
            TaskSelector::Id(id) => write!(f, "{id}"),
        }
    }
}

/// 編集前後のタスク
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChange {
    pub before: Task,
    pub after: Task,
}

/// タスク記録ドキュメント: ユーザーID → 日付 → タスク一覧（登録順）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskBook(BTreeMap<UserId, BTreeMap<NaiveDate, Vec<Task>>>);

impl TaskBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 指定日のタスク一覧。存在しなければ空スライス
    pub fn tasks_on(&self, user_id: &UserId, date: NaiveDate) -> &[Task] {
        self.0
            .get(user_id)
            .and_then(|dates| dates.get(&date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 1日1回の提出。既に提出済みの日は拒否
    pub fn submit(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        tasks: Vec<Task>,
    ) -> Result<&[Task], DomainError> {
        if tasks.is_empty() {
            return Err(DomainError::EmptySubmission);
        }
        if !self.tasks_on(user_id, date).is_empty() {
            return Err(DomainError::DuplicateSubmission(date.to_string()));
        }

        let list = self
            .0
            .entry(user_id.clone())
            .or_default()
            .entry(date)
            .or_default();
        list.extend(tasks);
        Ok(list.as_slice())
    }

    /// 指定されたタスクの添字（0始まり）を解決
    pub fn index_of(
        &self,
        user_id: &UserId,
        date: NaiveDate,
        selector: &TaskSelector,
    ) -> Result<usize, DomainError> {
        let tasks = self.tasks_on(user_id, date);
        let index = match selector {
            TaskSelector::Position(position) => position
                .checked_sub(1)
                .filter(|index| *index < tasks.len()),
            TaskSelector::Id(id) => tasks.iter().position(|task| &task.id == id),
        };
        index.ok_or_else(|| DomainError::TaskNotFound(selector.to_string()))
    }

    fn task_mut(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        selector: &TaskSelector,
    ) -> Result<&mut Task, DomainError> {
        let index = self.index_of(user_id, date, selector)?;
        self.0
            .get_mut(user_id)
            .and_then(|dates| dates.get_mut(&date))
            .and_then(|tasks| tasks.get_mut(index))
            .ok_or_else(|| DomainError::TaskNotFound(selector.to_string()))
    }

    /// 説明と作業時間を更新
    pub fn edit(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        selector: &TaskSelector,
        description: &str,
        duration: &str,
    ) -> Result<TaskChange, DomainError> {
        let replacement = Task::new(description, duration)?;
        let task = self.task_mut(user_id, date, selector)?;
        let before = task.clone();

        task.description = replacement.description;
        task.duration = replacement.duration;

        Ok(TaskChange {
            before,
            after: task.clone(),
        })
    }

    pub fn set_status(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        selector: &TaskSelector,
        status: TaskStatus,
    ) -> Result<TaskChange, DomainError> {
        let task = self.task_mut(user_id, date, selector)?;
        let before = task.clone();
        task.status = status;

        Ok(TaskChange {
            before,
            after: task.clone(),
        })
    }

    /// 添字（0始まり）でタスクを削除
    /// 日付のタスクが空になれば日付キーを、ユーザーの日付が空になればユーザーキーを削除する
    pub fn remove_at(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        index: usize,
    ) -> Result<Task, DomainError> {
        let dates = self
            .0
            .get_mut(user_id)
            .ok_or_else(|| DomainError::TaskNotFound(format!("#{}", index + 1)))?;
        let tasks = dates
            .get_mut(&date)
            .filter(|tasks| index < tasks.len())
            .ok_or_else(|| DomainError::TaskNotFound(format!("#{}", index + 1)))?;

        let removed = tasks.remove(index);

        if tasks.is_empty() {
            dates.remove(&date);
        }
        if dates.is_empty() {
            self.0.remove(user_id);
        }
        Ok(removed)
    }

    pub fn remove(
        &mut self,
        user_id: &UserId,
        date: NaiveDate,
        selector: &TaskSelector,
    ) -> Result<Task, DomainError> {
        let index = self.index_of(user_id, date, selector)?;
        self.remove_at(user_id, date, index)
    }

    /// 全エントリ（ユーザーID順、日付順、登録順）
    pub fn entries(&self) -> impl Iterator<Item = (&UserId, NaiveDate, &Task)> + '_ {
        self.0.iter().flat_map(|(user_id, dates)| {
            dates.iter().flat_map(move |(date, tasks)| {
                tasks.iter().map(move |task| (user_id, *date, task))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::from_string(id.to_string()).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn book_with(descriptions: &[&str]) -> TaskBook {
        let mut book = TaskBook::new();
        let tasks = descriptions
            .iter()
            .map(|d| Task::new(d, "1h").unwrap())
            .collect();
        book.submit(&user("1"), day(), tasks).unwrap();
        book
    }

    fn descriptions(book: &TaskBook) -> Vec<String> {
        book.tasks_on(&user("1"), day())
            .iter()
            .map(|t| t.description.clone())
            .collect()
    }

    #[test]
    fn test_parse_line_extracts_duration() {
        let task = Task::parse_line("Fix login bug - 2 hours").unwrap();
        assert_eq!(task.description, "Fix login bug");
        assert_eq!(task.duration, "2 hours");
        assert_eq!(task.status, TaskStatus::Pending);

        let task = Task::parse_line("- 30min: code review").unwrap();
        assert_eq!(task.description, "code review");
        assert_eq!(task.duration, "30min");

        let task = Task::parse_line("Standup (1h 15m)").unwrap();
        assert_eq!(task.description, "Standup");
        assert_eq!(task.duration, "1h 15m");

        let task = Task::parse_line("Deploy 1.5 HRS").unwrap();
        assert_eq!(task.duration, "1.5 HRS");
    }

    #[test]
    fn test_parse_line_without_duration_is_rejected() {
        assert!(matches!(
            Task::parse_line("Meet 5 members"),
            Err(DomainError::MissingDuration(_))
        ));
        assert!(matches!(
            Task::parse_line("Write docs"),
            Err(DomainError::MissingDuration(_))
        ));
        assert!(matches!(
            Task::parse_line("2h"),
            Err(DomainError::MissingDescription(_))
        ));
    }

    #[test]
    fn test_parse_submission_rejects_whole_text_on_bad_line() {
        let tasks = parse_submission("Fix bug - 2h\n\n  Review PR - 45 min\n").unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].description, "Review PR");

        assert!(parse_submission("Fix bug - 2h\nLunch").is_err());
        assert_eq!(parse_submission("  \n "), Err(DomainError::EmptySubmission));
    }

    #[test]
    fn test_task_status_from_string() {
        assert_eq!(TaskStatus::from_string("done").unwrap(), TaskStatus::Done);
        assert_eq!(
            TaskStatus::from_string("Not_Done").unwrap(),
            TaskStatus::NotDone
        );
        assert!(TaskStatus::from_string("later").is_err());
        assert_eq!(
            serde_json::to_string(&TaskStatus::NotDone).unwrap(),
            "\"not-done\""
        );
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(TaskSelector::parse("#2").unwrap(), TaskSelector::Position(2));
        let id = TaskId::new();
        assert_eq!(
            TaskSelector::parse(id.as_str()).unwrap(),
            TaskSelector::Id(id)
        );
        assert!(TaskSelector::parse("second").is_err());
    }

    #[test]
    fn test_selector_deserializes_numbers_and_strings() {
        let from = |json: &str| serde_json::from_str::<TaskSelector>(json);

        assert_eq!(from("2").unwrap(), TaskSelector::Position(2));
        assert_eq!(from("\"1\"").unwrap(), TaskSelector::Position(1));
        assert_eq!(from("\"#3\"").unwrap(), TaskSelector::Position(3));

        let id = TaskId::new();
        assert_eq!(
            from(&format!("\"{id}\"")).unwrap(),
            TaskSelector::Id(id)
        );
        assert!(from("\"second\"").is_err());
    }

    #[test]
    fn test_new_task_without_description_reports_duration() {
        assert_eq!(
            Task::new("   ", " 1h "),
            Err(DomainError::MissingDescription("1h".to_string()))
        );
        assert_eq!(
            DomainError::MissingDescription("1h".to_string()).to_string(),
            "Task line has no description: 1h"
        );
    }

    #[test]
    fn test_submit_once_per_day() {
        let mut book = book_with(&["a"]);
        let again = book.submit(&user("1"), day(), vec![Task::new("b", "2h").unwrap()]);

        assert_eq!(
            again,
            Err(DomainError::DuplicateSubmission("2024-05-06".to_string()))
        );
        assert_eq!(descriptions(&book), vec!["a"]);
    }

    #[test]
    fn test_remove_at_reindexes_contiguously() {
        let mut book = book_with(&["a", "b", "c", "d"]);

        let removed = book.remove_at(&user("1"), day(), 1).unwrap();

        assert_eq!(removed.description, "b");
        assert_eq!(descriptions(&book), vec!["a", "c", "d"]);
        let third = book
            .index_of(&user("1"), day(), &TaskSelector::Position(2))
            .unwrap();
        assert_eq!(book.tasks_on(&user("1"), day())[third].description, "c");
    }

    #[test]
    fn test_remove_last_task_removes_date_then_user() {
        let mut book = book_with(&["a"]);
        let other_day = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        book.submit(&user("1"), other_day, vec![Task::new("b", "1h").unwrap()])
            .unwrap();

        book.remove_at(&user("1"), day(), 0).unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert!(json["1"].get("2024-05-06").is_none());
        assert!(json["1"].get("2024-05-07").is_some());

        book.remove_at(&user("1"), other_day, 0).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_remove_out_of_range_is_not_found() {
        let mut book = book_with(&["a"]);
        assert!(matches!(
            book.remove_at(&user("1"), day(), 1),
            Err(DomainError::TaskNotFound(_))
        ));
        assert!(matches!(
            book.remove(&user("1"), day(), &TaskSelector::Position(0)),
            Err(DomainError::TaskNotFound(_))
        ));
        assert_eq!(descriptions(&book), vec!["a"]);
    }

    #[test]
    fn test_remove_by_id_is_stable_after_shift() {
        let mut book = book_with(&["a", "b", "c"]);
        let c_id = book.tasks_on(&user("1"), day())[2].id.clone();

        book.remove_at(&user("1"), day(), 0).unwrap();
        let removed = book
            .remove(&user("1"), day(), &TaskSelector::Id(c_id))
            .unwrap();

        assert_eq!(removed.description, "c");
        assert_eq!(descriptions(&book), vec!["b"]);
    }

    #[test]
    fn test_edit_and_status_change() {
        let mut book = book_with(&["a", "b"]);

        let change = book
            .edit(&user("1"), day(), &TaskSelector::Position(2), "b2", "3 hours")
            .unwrap();
        assert_eq!(change.before.description, "b");
        assert_eq!(change.after.description, "b2");
        assert_eq!(change.after.duration, "3 hours");
        assert_eq!(change.before.id, change.after.id);

        let bad = book.edit(&user("1"), day(), &TaskSelector::Position(1), "a", "soon");
        assert!(matches!(bad, Err(DomainError::MissingDuration(_))));
        assert_eq!(book.tasks_on(&user("1"), day())[0].duration, "1h");

        let change = book
            .set_status(&user("1"), day(), &TaskSelector::Position(1), TaskStatus::Done)
            .unwrap();
        assert_eq!(change.before.status, TaskStatus::Pending);
        assert_eq!(book.tasks_on(&user("1"), day())[0].status, TaskStatus::Done);
    }

    #[test]
    fn test_reads_documents_without_id_or_status() {
        let json = serde_json::json!({
            "42": {"2024-05-06": [{"task": "Fix bug", "time": "2h"}]}
        });

        let book: TaskBook = serde_json::from_value(json).unwrap();
        let tasks = book.tasks_on(&user("42"), day());

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "Fix bug");
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert!(!tasks[0].id.as_str().is_empty());
    }

    #[test]
    fn test_entries_are_ordered() {
        let mut book = book_with(&["a", "b"]);
        book.submit(&user("0"), day(), vec![Task::new("z", "1h").unwrap()])
            .unwrap();

        let order: Vec<_> = book
            .entries()
            .map(|(u, _, t)| format!("{}:{}", u, t.description))
            .collect();
        assert_eq!(order, vec!["0:z", "1:a", "1:b"]);
    }
}
