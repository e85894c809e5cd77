//! Shared types for the courier-chat client and its chat backend.

pub mod error;
pub mod protocol;

pub use error::*;
pub use protocol::*;
