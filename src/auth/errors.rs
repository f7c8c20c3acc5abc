use crate::gateway::GatewayError;

use super::session::Session;

/// What the UI should do with a failed remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub message: String,
    pub forced_logout: bool,
    pub offer_resend_verification: bool,
}

/// Maps a gateway failure to its user-facing outcome. An unauthorized
/// response clears the session before returning.
pub fn resolve(err: &GatewayError, session: &Session) -> Resolution {
    let forced_logout = err.requires_logout();
    if forced_logout {
        if let Err(store_err) = session.logout() {
            tracing::error!(error = %store_err, "unable to clear session after unauthorized response");
        }
    }
    Resolution {
        message: err.to_string(),
        forced_logout,
        offer_resend_verification: err.requires_verification(),
    }
}
