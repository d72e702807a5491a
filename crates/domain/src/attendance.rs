use crate::errors::DomainError;
use crate::identifiers::{UserId, DATE_FORMAT};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

/// 出勤ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    #[serde(rename = "Half-Day")]
    HalfDay,
    Absent,
}

impl AttendanceStatus {
    /// 文字列からステータスを作成（大文字小文字は区別しない）
    pub fn from_string(status: &str) -> Result<Self, DomainError> {
        match status.trim().to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "half-day" | "halfday" | "half_day" => Ok(AttendanceStatus::HalfDay),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(DomainError::InvalidAttendanceStatus(status.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::HalfDay => "Half-Day",
            AttendanceStatus::Absent => "Absent",
        }
    }

    /// カレンダー表示用の段階値（Present=2, Half-Day=1, Absent=0）
    pub fn level(&self) -> u8 {
        match self {
            AttendanceStatus::Present => 2,
            AttendanceStatus::HalfDay => 1,
            AttendanceStatus::Absent => 0,
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 打刻可能な時間帯（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PunchInWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl PunchInWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::InvalidPunchInWindow(format!(
                "start {} is after end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }
        Ok(Self { start, end })
    }

    /// `HH:MM` 形式の文字列から時間帯を作成
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        let parse = |value: &str| {
            NaiveTime::parse_from_str(value.trim(), "%H:%M")
                .map_err(|_| DomainError::InvalidPunchInWindow(format!("bad time: {value}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }
}

impl Default for PunchInWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 30, 0).expect("valid default start"),
            end: NaiveTime::from_hms_opt(10, 30, 0).expect("valid default end"),
        }
    }
}

impl std::fmt::Display for PunchInWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}–{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// 当日の打刻状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PunchInState {
    NotPunched,
    Punched(NaiveDate),
}

/// 集計対象の期間（両端を含む、未指定は無制限）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, DomainError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(DomainError::InvalidDate(format!(
                    "range start {from} is after range end {to}"
                )));
            }
        }
        Ok(Self { from, to })
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.from, self.to) {
            (Some(from), Some(to)) => write!(f, "{from} to {to}"),
            (Some(from), None) => write!(f, "since {from}"),
            (None, Some(to)) => write!(f, "until {to}"),
            (None, None) => write!(f, "all time"),
        }
    }
}

/// ステータス別の日数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceSummary {
    pub present: u32,
    pub half_day: u32,
    pub absent: u32,
}

impl AttendanceSummary {
    pub fn record(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::HalfDay => self.half_day += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.half_day + self.absent
    }
}

impl Add for AttendanceSummary {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            present: self.present + other.present,
            half_day: self.half_day + other.half_day,
            absent: self.absent + other.absent,
        }
    }
}

impl AddAssign for AttendanceSummary {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl std::iter::Sum for AttendanceSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// カレンダーの1日分
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub status: Option<AttendanceStatus>,
    pub level: u8,
}

type StoredRecords = BTreeMap<UserId, BTreeMap<String, AttendanceStatus>>;

/// 出勤記録ドキュメント: ユーザーID → 日付 → ステータス
///
/// `YYYY-MM-DD` として読めない日付キーは集計・カレンダーの対象外とし、
/// 保存時には元のキーのまま書き戻す。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceBook {
    records: BTreeMap<UserId, BTreeMap<NaiveDate, AttendanceStatus>>,
    unrecognized: StoredRecords,
}

impl AttendanceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.unrecognized.is_empty()
    }

    pub fn records_for(&self, user_id: &UserId) -> Option<&BTreeMap<NaiveDate, AttendanceStatus>> {
        self.records.get(user_id)
    }

    pub fn status_on(&self, user_id: &UserId, date: NaiveDate) -> Option<AttendanceStatus> {
        self.records
            .get(user_id)
            .and_then(|dates| dates.get(&date))
            .copied()
    }

    /// ステータスを設定（後勝ち）。以前のステータスを返す
    pub fn set_status(
        &mut self,
        user_id: UserId,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> Option<AttendanceStatus> {
        self.records.entry(user_id).or_default().insert(date, status)
    }

    pub fn punch_state(&self, user_id: &UserId, today: NaiveDate) -> PunchInState {
        match self.status_on(user_id, today) {
            Some(_) => PunchInState::Punched(today),
            None => PunchInState::NotPunched,
        }
    }

    /// 打刻: NotPunched → Punched(today)
    /// 時間帯外、または当日のステータスが既にある場合は拒否
    pub fn punch_in(
        &mut self,
        user_id: &UserId,
        now: NaiveDateTime,
        window: &PunchInWindow,
    ) -> Result<NaiveDate, DomainError> {
        if !window.contains(now.time()) {
            return Err(DomainError::OutsidePunchInWindow {
                start: window.start().format("%H:%M").to_string(),
                end: window.end().format("%H:%M").to_string(),
            });
        }

        let today = now.date();
        if let PunchInState::Punched(_) = self.punch_state(user_id, today) {
            return Err(DomainError::AlreadyPunchedIn);
        }

        self.set_status(user_id.clone(), today, AttendanceStatus::Present);
        Ok(today)
    }

    pub fn summary(&self, user_id: &UserId, range: &DateRange) -> AttendanceSummary {
        let mut summary = AttendanceSummary::default();
        if let Some(dates) = self.records.get(user_id) {
            dates
                .iter()
                .filter(|(date, _)| range.contains(**date))
                .for_each(|(_, status)| summary.record(*status));
        }
        summary
    }

    pub fn team_summary<'a>(
        &self,
        members: impl IntoIterator<Item = &'a UserId>,
        range: &DateRange,
    ) -> AttendanceSummary {
        members
            .into_iter()
            .map(|user_id| self.summary(user_id, range))
            .sum()
    }

    /// `today` で終わる直近 `days` 日分（古い順）。記録のない日は欠勤扱い
    pub fn calendar(&self, user_id: &UserId, today: NaiveDate, days: u32) -> Vec<CalendarDay> {
        (0..i64::from(days))
            .rev()
            .map(|offset| today - Duration::days(offset))
            .map(|date| {
                let status = self.status_on(user_id, date);
                CalendarDay {
                    date,
                    status,
                    level: status.map_or(0, |s| s.level()),
                }
            })
            .collect()
    }

    /// 全エントリ（ユーザーID順、日付順）
    pub fn entries(&self) -> impl Iterator<Item = (&UserId, NaiveDate, AttendanceStatus)> + '_ {
        self.records.iter().flat_map(|(user_id, dates)| {
            dates
                .iter()
                .map(move |(date, status)| (user_id, *date, *status))
        })
    }
}

/// 書式どおりの日付キーだけを受け付ける（`2024-5-6` などは書き戻しで変わるため除外）
fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_FORMAT)
        .ok()
        .filter(|date| date.format(DATE_FORMAT).to_string() == key)
}

impl Serialize for AttendanceBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut stored = self.unrecognized.clone();
        for (user_id, dates) in &self.records {
            let entry = stored.entry(user_id.clone()).or_default();
            for (date, status) in dates {
                entry.insert(date.format(DATE_FORMAT).to_string(), *status);
            }
        }
        stored.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AttendanceBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stored = StoredRecords::deserialize(deserializer)?;

        let mut book = AttendanceBook::new();
        for (user_id, dates) in stored {
            for (key, status) in dates {
                match parse_date_key(&key) {
                    Some(date) => {
                        book.records
                            .entry(user_id.clone())
                            .or_default()
                            .insert(date, status);
                    }
                    None => {
                        book.unrecognized
                            .entry(user_id.clone())
                            .or_default()
                            .insert(key, status);
                    }
                }
            }
        }
        Ok(book)
    }
}
