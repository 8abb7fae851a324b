//! Admin authentication endpoints.

pub mod credentials;
pub mod login;
pub mod session;
pub mod state;
pub mod types;


pub use state::{AuthConfig, AuthState};
