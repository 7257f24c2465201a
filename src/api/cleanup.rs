use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::api::error::ApiError;
use crate::api::{require_session, SessionQuery};
use crate::cleanup::engine::CleanupEngine;
use crate::cleanup::{CleanupOutcome, CleanupRequest, MailboxStats, PreviewOutcome};
use crate::mailbox::gmail::GmailMailbox;
use crate::session::Session;
use crate::AppState;

fn engine_for(state: &AppState, session: &Session) -> CleanupEngine {
    let mailbox = GmailMailbox::new(state.http.clone(), session.credential.clone());
    CleanupEngine::new(Arc::new(mailbox))
}

/// GET /api/gmail/stats — match counts for the four fixed categories
pub async fn stats(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<MailboxStats>, ApiError> {
    let session = require_session(&state, &query.session_id).await?;

    Ok(Json(engine_for(&state, &session).stats().await))
}

/// POST /api/gmail/preview — sender groups for the selected categories
pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(request): Json<CleanupRequest>,
) -> Result<Json<PreviewOutcome>, ApiError> {
    let session = require_session(&state, &query.session_id).await?;
    tracing::info!("Building cleanup preview for {}", session.owner.email);

    Ok(Json(engine_for(&state, &session).preview(&request).await))
}

/// POST /api/gmail/cleanup — delete everything the selected categories match
pub async fn cleanup(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    Json(request): Json<CleanupRequest>,
) -> Result<Json<CleanupOutcome>, ApiError> {
    let session = require_session(&state, &query.session_id).await?;
    tracing::info!("Starting cleanup for {}", session.owner.email);

    Ok(Json(engine_for(&state, &session).cleanup(&request).await))
}
