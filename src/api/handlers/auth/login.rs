//! Interactive login endpoint.
//!
//! Every rejection uses the same literal body, whether the identifier is
//! unknown or the secret is wrong; only infrastructure failures look
//! different (500). Nothing here retries.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use tracing::{error, info};

use super::session::session_cookie;
use super::state::AuthState;
use super::types::{LoginRequest, MessageResponse};
use crate::auth::identifier::{normalize_identifier, valid_identifier};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; session cookie set", body = MessageResponse),
        (status = 400, description = "Missing or malformed fields", body = String),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 500, description = "Infrastructure failure", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    // Validation failures never reach the store.
    let identifier = normalize_identifier(&request.identifier);
    if identifier.is_empty() || request.secret.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Identifier and secret are required".to_string(),
        )
            .into_response();
    }
    if !valid_identifier(&identifier) {
        return (StatusCode::BAD_REQUEST, "Invalid identifier".to_string()).into_response();
    }

    let account = match state.service().authenticate(&identifier, &request.secret).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            return (StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS.to_string()).into_response()
        }
        Err(err) => {
            error!("Login failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    };

    let token = match state.gate().establish(account.id).await {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to establish session: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    };

    let mut headers = HeaderMap::new();
    match session_cookie(state.config(), &token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    }

    info!("Admin login succeeded");

    (
        StatusCode::OK,
        headers,
        Json(MessageResponse {
            message: "Login successful".to_string(),
        }),
    )
        .into_response()
}
