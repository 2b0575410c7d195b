//! Domain types shared across the service

pub mod user;

pub use user::UserIdentity;
