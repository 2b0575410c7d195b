//! Infrastructure implementations

pub mod auth;
pub mod logging;
