use chrono::{DateTime, Datelike, Utc};
use reqwest::Url;
use std::fs;
use std::path::Path;

const MONTHS_GENITIVE: [&str; 12] = [
    "січня",
    "лютого",
    "березня",
    "квітня",
    "травня",
    "червня",
    "липня",
    "серпня",
    "вересня",
    "жовтня",
    "листопада",
    "грудня",
];

pub const TAKE_SURVEY_PATH: &str = "/pages/take-survey.html";

pub fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Unable to create directory {}: {e}", path.display()))
}

pub fn write_string(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(path, content).map_err(|e| format!("Unable to write {}: {e}", path.display()))
}

/// Long Ukrainian date, e.g. `18 жовтня 2026 р.`
pub fn format_date_uk(date: &DateTime<Utc>) -> String {
    let month = MONTHS_GENITIVE[date.month0() as usize];
    format!("{} {} {} р.", date.day(), month, date.year())
}

/// `Xхв Yс`, used for average completion time.
pub fn format_duration(seconds: u64) -> String {
    format!("{}хв {}с", seconds / 60, seconds % 60)
}

/// `m:ss`, the respondent's running clock.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Address a respondent opens to take the survey.
pub fn public_link(origin: &str, unique_link: &str) -> Result<String, String> {
    let mut url = Url::parse(origin)
        .and_then(|base| base.join(TAKE_SURVEY_PATH))
        .map_err(|e| format!("Invalid public origin '{origin}': {e}"))?;
    url.query_pairs_mut().append_pair("link", unique_link);
    Ok(url.to_string())
}
