//! User service: account settings.

use plugdash_domain::error::PlugDashError;
use plugdash_domain::user::PasswordChange;

use crate::ports::UserApi;

pub struct UserService<U> {
    api: U,
}

impl<U: UserApi> UserService<U> {
    pub fn new(api: U) -> Self {
        Self { api }
    }

    /// Change the password after checking the form locally.
    ///
    /// # Errors
    ///
    /// Returns [`PlugDashError::Validation`] without any request when the
    /// form is invalid, otherwise the backend error.
    #[tracing::instrument(skip(self, change))]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), PlugDashError> {
        change.validate()?;
        self.api.change_password(change).await?;
        tracing::info!("password changed");
        Ok(())
    }
}
