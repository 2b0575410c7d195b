//! User identity types

mod entity;
mod validation;

pub use entity::UserIdentity;
pub use validation::{validate_email, validate_user_id, UserValidationError};
