use reqwest::Url;
use std::fmt;

use crate::auth::Session;

const ROUTE_BASE: &str = "http://localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Root,
    Register,
    Login,
    Dashboard,
    CreateSurvey,
    SurveyDetail { id: Option<String> },
    TakeSurvey { link: Option<String> },
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    GuestOnly,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    Allow,
    Redirect(Route),
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.trim().is_empty())
}

/// `path?key=value` with the value form-encoded.
fn with_query(path: &str, key: &str, value: &str) -> String {
    match Url::parse(ROUTE_BASE).and_then(|base| base.join(path)) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(key, value);
            format!("{}?{}", url.path(), url.query().unwrap_or_default())
        }
        Err(_) => format!("{path}?{key}={value}"),
    }
}

impl Route {
    /// Parses a path with optional query, e.g. `/pages/survey-detail.html?id=42`.
    pub fn parse(location: &str) -> Self {
        let url = match Url::parse(ROUTE_BASE).and_then(|base| base.join(location)) {
            Ok(url) => url,
            Err(_) => return Self::NotFound(location.to_string()),
        };
        match url.path() {
            "/" | "" => Self::Root,
            "/pages/register.html" => Self::Register,
            "/pages/login.html" => Self::Login,
            "/pages/dashboard.html" => Self::Dashboard,
            "/pages/create-survey.html" => Self::CreateSurvey,
            "/pages/survey-detail.html" => Self::SurveyDetail {
                id: query_value(&url, "id"),
            },
            "/pages/take-survey.html" => Self::TakeSurvey {
                link: query_value(&url, "link"),
            },
            other => Self::NotFound(other.to_string()),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Register | Self::Login => Access::GuestOnly,
            Self::Dashboard | Self::CreateSurvey | Self::SurveyDetail { .. } => Access::Protected,
            Self::Root | Self::TakeSurvey { .. } | Self::NotFound(_) => Access::Public,
        }
    }

    /// Where a visitor actually lands, given whether they hold a session.
    pub fn guard(&self, authenticated: bool) -> Guard {
        if *self == Self::Root {
            return Guard::Redirect(Self::Register);
        }
        match (self.access(), authenticated) {
            (Access::Protected, false) => Guard::Redirect(Self::Login),
            (Access::GuestOnly, true) => Guard::Redirect(Self::Dashboard),
            _ => Guard::Allow,
        }
    }

    pub fn guard_session(&self, session: &Session) -> Guard {
        self.guard(session.is_authenticated())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "/"),
            Self::Register => write!(f, "/pages/register.html"),
            Self::Login => write!(f, "/pages/login.html"),
            Self::Dashboard => write!(f, "/pages/dashboard.html"),
            Self::CreateSurvey => write!(f, "/pages/create-survey.html"),
            Self::SurveyDetail { id: Some(id) } => {
                f.write_str(&with_query("/pages/survey-detail.html", "id", id))
            }
            Self::SurveyDetail { id: None } => write!(f, "/pages/survey-detail.html"),
            Self::TakeSurvey { link: Some(link) } => {
                f.write_str(&with_query("/pages/take-survey.html", "link", link))
            }
            Self::TakeSurvey { link: None } => write!(f, "/pages/take-survey.html"),
            Self::NotFound(path) => write!(f, "{path}"),
        }
    }
}
