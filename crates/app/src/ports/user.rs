//! User port: login, token verification and password changes.

use std::future::Future;

use plugdash_domain::error::PlugDashError;
use plugdash_domain::user::{AccessToken, Credentials, PasswordChange, VerifiedUser};

pub trait UserApi {
    /// Exchange credentials for a bearer token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AccessToken, PlugDashError>> + Send;

    /// Check the current token. Fails with [`PlugDashError::Unauthorized`]
    /// when it is missing, expired or revoked.
    fn verify_token(&self) -> impl Future<Output = Result<VerifiedUser, PlugDashError>> + Send;

    fn change_password(
        &self,
        change: &PasswordChange,
    ) -> impl Future<Output = Result<(), PlugDashError>> + Send;
}

impl<T: UserApi + Send + Sync> UserApi for std::sync::Arc<T> {
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AccessToken, PlugDashError>> + Send {
        (**self).login(credentials)
    }

    fn verify_token(&self) -> impl Future<Output = Result<VerifiedUser, PlugDashError>> + Send {
        (**self).verify_token()
    }

    fn change_password(
        &self,
        change: &PasswordChange,
    ) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        (**self).change_password(change)
    }
}
