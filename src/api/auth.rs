use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::error::ApiError;
use crate::api::{require_session, SessionQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginQuery {
    #[serde(default)]
    force_account_selection: bool,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub email: String,
    pub name: String,
    pub picture: String,
}

/// GET /api/auth/login — hand the frontend a Google consent URL
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let auth_url =
        crate::auth::authorization_url(&state.config.google, query.force_account_selection)
            .map_err(ApiError::from)?;

    Ok(Json(json!({ "authUrl": auth_url })))
}

/// GET /api/auth/callback — OAuth redirect target; creates the session and
/// bounces the browser back to the frontend
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let frontend = &state.config.frontend.url;

    if let Some(error) = query.error.filter(|e| !e.is_empty()) {
        tracing::warn!("OAuth callback error: {}", error);
        return Redirect::to(&format!("{frontend}/login?error={error}")).into_response();
    }

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return ApiError::BadRequest("No authorization code provided".to_string()).into_response();
    };

    match crate::auth::complete_login(&state.config.google, &state.http, code).await {
        Ok((owner, credential)) => {
            let email = owner.email.clone();
            let handle = state.sessions.create(owner, credential).await;
            tracing::info!("Session created for {}", email);
            Redirect::to(&format!("{frontend}/dashboard?sessionId={handle}")).into_response()
        }
        Err(err) => {
            tracing::error!("OAuth login failed: {:#}", err);
            Redirect::to(&format!("{frontend}/login?error=auth_failed")).into_response()
        }
    }
}

/// GET /api/auth/user — profile of the session owner
pub async fn user(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<UserInfoResponse>, ApiError> {
    let session = require_session(&state, &query.session_id).await?;

    Ok(Json(UserInfoResponse {
        email: session.owner.email,
        name: session.owner.name,
        picture: session.owner.picture,
    }))
}

/// POST /api/auth/logout — drop the session; fine to call twice
pub async fn logout(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Json<serde_json::Value> {
    state.sessions.remove(&query.session_id).await;
    Json(json!({ "message": "Logged out successfully" }))
}
