//! Data models for the prompt.rip auth API

pub mod auth;
pub use auth::*;
