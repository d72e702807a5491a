//! 表示アダプターに渡す返信モデル
//!
//! 埋め込みや画像の実際の描画はチャットプラットフォーム側のアダプターが行う。

use crate::errors::AppError;
use chrono::NaiveDateTime;
use domain::CalendarDay;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedColor {
    Green,
    Blue,
    Purple,
    Gold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: EmbedColor,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}

impl Embed {
    pub fn new(title: impl Into<String>, color: EmbedColor) -> Self {
        Self {
            title: title.into(),
            description: None,
            color,
            fields: Vec::new(),
            timestamp: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// 出勤カレンダー画像の元データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarChart {
    pub title: String,
    pub days: Vec<CalendarDay>,
}

/// 1回の操作に対する返信
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<Embed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<CalendarChart>,
    pub ephemeral: bool,
    /// ログチャンネルに投稿するメッセージ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audit: Option<String>,
}

impl Reply {
    /// 本人にだけ見えるテキスト返信
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embed: None,
            calendar: None,
            ephemeral: true,
            audit: None,
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            content: None,
            embed: Some(embed),
            calendar: None,
            ephemeral: true,
            audit: None,
        }
    }

    pub fn calendar(content: impl Into<String>, chart: CalendarChart) -> Self {
        Self {
            content: Some(content.into()),
            embed: None,
            calendar: Some(chart),
            ephemeral: true,
            audit: None,
        }
    }

    pub fn from_error(error: &AppError) -> Self {
        Self::message(error.user_message())
    }

    pub fn with_audit(mut self, audit: impl Into<String>) -> Self {
        self.audit = Some(audit.into());
        self
    }
}
