pub mod auth;
pub mod cleanup;
pub mod error;
pub mod router;

use serde::Deserialize;

use crate::session::Session;
use crate::AppState;
use self::error::ApiError;

/// Query string every authenticated endpoint carries.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub session_id: String,
}

/// Look up the caller's session, or fail with the authorization error the
/// frontend expects for a missing or expired handle.
pub async fn require_session(state: &AppState, handle: &str) -> Result<Session, ApiError> {
    state
        .sessions
        .get(handle)
        .await
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session".to_string()))
}
