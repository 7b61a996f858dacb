//! Account credentials, tokens and password changes.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum length of a new password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Login form. Sent form-encoded, never logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingCredentials`] when either field is blank.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let credentials = Self {
            username: username.into(),
            password: password.into(),
        };
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(ValidationError::MissingCredentials);
        }
        Ok(credentials)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Bearer token returned by `POST /user/login`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
}

fn bearer() -> String {
    "bearer".to_string()
}

impl AccessToken {
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            access_token: token.into(),
            token_type: bearer(),
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

/// Identity behind a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    pub username: String,
}

/// Body of `POST /user/change-password`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// # Errors
    ///
    /// Returns the first rule the form breaks: current password missing,
    /// new password shorter than [`MIN_PASSWORD_LEN`], or confirmation mismatch.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.current_password.is_empty() {
            return Err(ValidationError::MissingCurrentPassword);
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        if self.new_password != self.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        Ok(())
    }
}

impl std::fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordChange { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(current: &str, new: &str, confirm: &str) -> PasswordChange {
        PasswordChange {
            current_password: current.to_string(),
            new_password: new.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    #[test]
    fn should_accept_valid_password_change() {
        assert_eq!(change("old", "hunter22", "hunter22").validate(), Ok(()));
    }

    #[test]
    fn should_reject_short_new_password() {
        assert_eq!(
            change("old", "short", "short").validate(),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
    }

    #[test]
    fn should_reject_mismatched_confirmation() {
        assert_eq!(
            change("old", "hunter22", "hunter23").validate(),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn should_require_current_password() {
        assert_eq!(
            change("", "hunter22", "hunter22").validate(),
            Err(ValidationError::MissingCurrentPassword)
        );
    }

    #[test]
    fn should_reject_blank_credentials() {
        assert_eq!(
            Credentials::new(" ", "pw").unwrap_err(),
            ValidationError::MissingCredentials
        );
        assert!(Credentials::new("admin", "pw").is_ok());
    }

    #[test]
    fn should_not_leak_secrets_in_debug_output() {
        let creds = Credentials::new("admin", "s3cret").unwrap();
        assert!(!format!("{creds:?}").contains("s3cret"));
        let token = AccessToken::bearer("abc.def.ghi");
        assert!(!format!("{token:?}").contains("abc.def"));
    }

    #[test]
    fn should_default_token_type_to_bearer() {
        let token: AccessToken =
            serde_json::from_value(serde_json::json!({"access_token": "t"})).unwrap();
        assert_eq!(token.token_type, "bearer");
    }
}
