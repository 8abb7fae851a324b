//! Core authentication logic: password hashing, account service, sessions.

pub mod identifier;
pub mod password;
pub mod service;
pub mod session;

pub use service::{AccountService, ChangeOutcome, CreateOutcome};
pub use session::SessionGate;
