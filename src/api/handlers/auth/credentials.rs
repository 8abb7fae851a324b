//! Credential-update endpoint.
//!
//! Requires a trusted session, and still re-verifies the current secret via
//! the service; the session alone never authorizes a credential change. A
//! password change revokes every session for the account, so the response
//! also clears the caller's cookie.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, info};

use super::session::{clear_session_cookie, require_session};
use super::state::AuthState;
use super::types::{MessageResponse, UpdateCredentialsRequest};
use crate::auth::identifier::{normalize_identifier, valid_identifier};
use crate::auth::ChangeOutcome;

#[utoipa::path(
    put,
    path = "/v1/admin/credentials",
    request_body = UpdateCredentialsRequest,
    responses(
        (status = 200, description = "Credentials updated", body = MessageResponse),
        (status = 400, description = "Missing or malformed fields, or nothing to update", body = String),
        (status = 401, description = "Missing session or invalid credentials", body = String),
        (status = 409, description = "Identifier already in use", body = String),
        (status = 500, description = "Infrastructure failure", body = String)
    ),
    tag = "auth"
)]
pub async fn update_credentials(
    headers: HeaderMap,
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<UpdateCredentialsRequest>>,
) -> impl IntoResponse {
    if let Err(status) = require_session(&headers, &state).await {
        return status.into_response();
    }

    let request: UpdateCredentialsRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if request.current_identifier.trim().is_empty() || request.current_secret.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Current identifier and secret are required".to_string(),
        )
            .into_response();
    }
    if let Some(new_identifier) = request.new_identifier.as_deref() {
        if !valid_identifier(&normalize_identifier(new_identifier)) {
            return (StatusCode::BAD_REQUEST, "Invalid new identifier".to_string())
                .into_response();
        }
    }

    let secret_changes = request
        .new_secret
        .as_deref()
        .is_some_and(|secret| !secret.is_empty());

    let outcome = state
        .service()
        .change_credentials(
            &request.current_identifier,
            &request.current_secret,
            request.new_identifier.as_deref(),
            request.new_secret.as_deref(),
        )
        .await;

    match outcome {
        Ok(ChangeOutcome::Updated(_)) => {
            info!("Admin credentials updated");
            let mut headers = HeaderMap::new();
            if secret_changes {
                // All sessions were revoked; the caller logs in again.
                if let Ok(cookie) = clear_session_cookie(state.config()) {
                    headers.insert(SET_COOKIE, cookie);
                }
            }
            (
                StatusCode::OK,
                headers,
                Json(MessageResponse {
                    message: "Credentials updated".to_string(),
                }),
            )
                .into_response()
        }
        Ok(ChangeOutcome::InvalidCredentials) => {
            (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()).into_response()
        }
        Ok(ChangeOutcome::IdentifierInUse) => (
            StatusCode::CONFLICT,
            "Identifier already in use".to_string(),
        )
            .into_response(),
        Ok(ChangeOutcome::NothingToUpdate) => {
            (StatusCode::BAD_REQUEST, "Nothing to update".to_string()).into_response()
        }
        Err(err) => {
            error!("Credential update failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Credential update failed".to_string(),
            )
                .into_response()
        }
    }
}
