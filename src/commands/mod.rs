//! Page-level flows composed from the session, the gateway and the state
//! machines. Each function is one user action.

pub mod auth;
pub mod create;
pub mod dashboard;
pub mod detail;
pub mod take;

use thiserror::Error;

use crate::auth::{FormError, FormErrors, Session};
use crate::draft::DraftError;
use crate::gateway::GatewayError;
use crate::response::CollectorError;
use crate::routes::{Guard, Route};
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Form(#[from] FormErrors),
    #[error(transparent)]
    Field(#[from] FormError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Collector(#[from] CollectorError),
    #[error("Увійдіть, щоб продовжити ({0})")]
    Unauthenticated(Route),
    #[error("{0}")]
    Invalid(String),
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        Self::Invalid(message)
    }
}

/// Refuses protected pages without a session, as the page guards do.
pub(crate) fn require_session(route: Route, session: &Session) -> Result<(), CommandError> {
    match route.guard_session(session) {
        Guard::Allow => Ok(()),
        Guard::Redirect(_) => Err(CommandError::Unauthenticated(route)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::auth::Session;
    use crate::gateway::types::User;
    use crate::gateway::HttpGateway;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    pub fn user() -> User {
        User {
            id: "u1".to_string(),
            username: "olena".to_string(),
            email: "olena@example.com".to_string(),
            is_verified: true,
            avatar: None,
        }
    }

    pub fn gateway(base: &str, signed_in: bool) -> HttpGateway {
        let session = Session::new(Arc::new(MemoryStore::new()));
        if signed_in {
            session.login("tok", &user()).expect("login");
        }
        HttpGateway::new(base, Duration::from_secs(5), session).expect("gateway")
    }
}
