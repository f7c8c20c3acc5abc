use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    #[default]
    Text,
    Textarea,
    Radio,
    Checkbox,
    Rating,
}

impl QuestionType {
    pub const ALL: [QuestionType; 5] = [
        Self::Text,
        Self::Textarea,
        Self::Radio,
        Self::Checkbox,
        Self::Rating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Rating => "rating",
        }
    }

    /// Radio and checkbox questions carry an option list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Radio | Self::Checkbox)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Коротка відповідь",
            Self::Textarea => "Довга відповідь",
            Self::Radio => "Один варіант",
            Self::Checkbox => "Кілька варіантів",
            Self::Rating => "Оцінка",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                format!("question type must be one of text, textarea, radio, checkbox, rating (got '{value}').")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: usize,
}

impl Question {
    /// A fresh text question at the given position.
    pub fn blank(order: usize) -> Self {
        Self {
            question_text: String::new(),
            question_type: QuestionType::Text,
            options: Vec::new(),
            required: false,
            order,
        }
    }

    pub fn non_empty_options(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| !o.trim().is_empty())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySettings {
    pub allow_anonymous: bool,
    pub one_response_per_user: bool,
    pub show_results: bool,
    #[serde(default)]
    pub close_date: Option<DateTime<Utc>>,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            allow_anonymous: true,
            one_response_per_user: false,
            show_results: false,
            close_date: None,
        }
    }
}

/// Author-side survey under construction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub settings: SurveySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

/// A question as stored by the server, carrying its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub question: Question,
}

/// Server-confirmed survey. Read-only for respondents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDefinition {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<SurveyQuestion>,
    #[serde(default)]
    pub settings: SurveySettings,
    #[serde(default)]
    pub unique_link: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub cover_image: Option<ImageRef>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub response_count: u64,
}

impl SurveyDefinition {
    pub fn question(&self, id: &str) -> Option<&SurveyQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }
}
