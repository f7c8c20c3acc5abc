use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::survey::{AnswerValue, ImageRef, QuestionType, SurveySettings};

/// Most endpoints wrap their payload in `{ "data": ... }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub avatar: Option<ImageRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MeResponse {
    pub user: User,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<SurveySettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LinkResponse {
    pub unique_link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEntry {
    pub question_id: String,
    pub answer_value: Option<AnswerValue>,
}

/// Body of `POST /public/survey/:link/submit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSubmission {
    pub answers: Vec<AnswerEntry>,
    pub completion_time: u64,
}

/// A file picked for multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn from_path(path: &Path) -> Result<Self, String> {
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Unable to read {}: {e}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime = mime_for(&file_name).to_string();
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default)]
    pub total_responses: u64,
    #[serde(default)]
    pub average_completion_time: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DateCount {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionChartData {
    #[serde(default)]
    pub chart_type: String,
    #[serde(default)]
    pub labels: Vec<Value>,
    #[serde(default)]
    pub values: Vec<u64>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub total_answers: u64,
}

impl QuestionChartData {
    /// Free-text questions list answers instead of a chart.
    pub fn is_text(&self) -> bool {
        self.chart_type == "text"
    }

    pub fn label_strings(&self) -> Vec<String> {
        self.labels
            .iter()
            .map(|l| match l {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    /// Share of each bar in the total, one decimal place.
    pub fn percentages(&self) -> Vec<f64> {
        let total: u64 = self.values.iter().sum();
        self.values
            .iter()
            .map(|v| {
                if total == 0 {
                    0.0
                } else {
                    ((*v as f64 / total as f64) * 1000.0).round() / 10.0
                }
            })
            .collect()
    }

    /// Answers the API held back from the sample it returned.
    pub fn hidden_answers(&self) -> u64 {
        self.total_answers.saturating_sub(self.answers.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalytics {
    pub question_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub total_answers: u64,
    #[serde(default)]
    pub data: Option<QuestionChartData>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnalytics {
    #[serde(default)]
    pub summary: AnalyticsSummary,
    #[serde(default)]
    pub responses_by_date: Vec<DateCount>,
    #[serde(default)]
    pub question_analytics: Vec<QuestionAnalytics>,
}
