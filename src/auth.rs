//! Credential models persisted and attached by the client.

pub mod token;
pub mod user;

pub use token::*;
pub use user::*;
