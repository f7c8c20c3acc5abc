use serde::Deserialize;
use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "Щось пішло не так";

/// Machine-readable codes the API may attach next to `message`.
pub const CODE_EMAIL_NOT_VERIFIED: &str = "EMAIL_NOT_VERIFIED";
pub const CODE_TOKEN_INVALID: &str = "TOKEN_INVALID";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    EmailNotVerified,
    Forbidden,
    NotFound,
    Invalid,
    Server,
    Transport,
    Decode,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Non-2xx response. `message` is shown to the user verbatim.
    #[error("{message}")]
    Api {
        kind: ErrorKind,
        status: u16,
        message: String,
    },
    #[error("Не вдалося з'єднатися з сервером: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Некоректна відповідь сервера: {0}")]
    Decode(String),
    #[error("Некоректна адреса API: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

fn classify(status: u16, code: Option<&str>) -> ErrorKind {
    match code {
        Some(CODE_EMAIL_NOT_VERIFIED) => return ErrorKind::EmailNotVerified,
        Some(CODE_TOKEN_INVALID) => return ErrorKind::Unauthorized,
        _ => {}
    }
    match status {
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        400 | 409 | 422 => ErrorKind::Invalid,
        _ => ErrorKind::Server,
    }
}

impl GatewayError {
    pub fn api(kind: ErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            kind,
            status,
            message: message.into(),
        }
    }

    /// Builds the error for a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        Self::api(classify(status, parsed.code.as_deref()), status, message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { kind, .. } => *kind,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidUrl(_) => ErrorKind::Transport,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn requires_logout(&self) -> bool {
        self.kind() == ErrorKind::Unauthorized
    }

    pub fn requires_verification(&self) -> bool {
        self.kind() == ErrorKind::EmailNotVerified
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, GatewayError, FALLBACK_MESSAGE};

    #[test]
    fn status_drives_kind_when_no_code() {
        assert_eq!(GatewayError::from_response(401, "{}").kind(), ErrorKind::Unauthorized);
        assert_eq!(GatewayError::from_response(404, "{}").kind(), ErrorKind::NotFound);
        assert_eq!(GatewayError::from_response(422, "{}").kind(), ErrorKind::Invalid);
        assert_eq!(GatewayError::from_response(503, "{}").kind(), ErrorKind::Server);
    }

    #[test]
    fn explicit_code_wins_over_status_and_wording() {
        let err = GatewayError::from_response(
            403,
            r#"{"message":"Будь ласка, підтвердіть email","code":"EMAIL_NOT_VERIFIED"}"#,
        );
        assert!(err.requires_verification());
        assert!(!err.requires_logout());
        assert_eq!(err.to_string(), "Будь ласка, підтвердіть email");

        // Wording alone never triggers a logout.
        let reworded = GatewayError::from_response(400, r#"{"message":"Не авторизовано, токен"}"#);
        assert!(!reworded.requires_logout());
    }

    #[test]
    fn unreadable_body_falls_back_to_generic_message() {
        let err = GatewayError::from_response(500, "<html>oops</html>");
        assert_eq!(err.to_string(), FALLBACK_MESSAGE);
        assert_eq!(err.status(), Some(500));
    }
}
