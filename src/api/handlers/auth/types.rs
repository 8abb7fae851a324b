//! Request/response types for auth endpoints.
//!
//! Secret-bearing types implement `Debug` manually so a stray debug log can
//! never leak a password.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("secret", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize)]
pub struct UpdateCredentialsRequest {
    pub current_identifier: String,
    pub current_secret: String,
    #[serde(default)]
    pub new_identifier: Option<String>,
    #[serde(default)]
    pub new_secret: Option<String>,
}

impl fmt::Debug for UpdateCredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateCredentialsRequest")
            .field("current_identifier", &self.current_identifier)
            .field("current_secret", &"***")
            .field("new_identifier", &self.new_identifier)
            .field("new_secret", &self.new_secret.as_ref().map(|_| "***"))
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub account_id: String,
    pub identifier: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}
