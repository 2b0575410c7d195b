//! User identity as handed over by the user-management service
//!
//! This service never sees passwords; credential verification happens in the
//! external user-management collaborator, which then forwards this identity
//! for token issuance.

use serde::{Deserialize, Serialize};

use super::validation::{validate_email, validate_user_id, UserValidationError};

/// An authenticated user identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    user_id: i64,
    email: String,
    is_active: bool,
}

impl UserIdentity {
    /// Create a validated identity
    pub fn new(
        user_id: i64,
        email: impl Into<String>,
        is_active: bool,
    ) -> Result<Self, UserValidationError> {
        let email = email.into();
        validate_user_id(user_id)?;
        validate_email(&email)?;

        Ok(Self {
            user_id,
            email,
            is_active,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}
