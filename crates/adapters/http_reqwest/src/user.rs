//! [`UserApi`] over `/user`.

use std::future::Future;

use reqwest::Method;

use plugdash_app::ports::{TokenStore, UserApi};
use plugdash_domain::error::PlugDashError;
use plugdash_domain::user::{AccessToken, Credentials, PasswordChange, VerifiedUser};

use crate::client::{self, HttpApiClient};

impl<T: TokenStore + Sync> UserApi for HttpApiClient<T> {
    /// `POST /user/login` with an OAuth2 password form; no bearer token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AccessToken, PlugDashError>> + Send {
        let request = self
            .anonymous(Method::POST, self.endpoint(&["user", "login"]))
            .form(credentials);
        async move {
            let response = client::send(request, None).await?;
            Ok(client::read_json(response).await?)
        }
    }

    fn verify_token(&self) -> impl Future<Output = Result<VerifiedUser, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["user", "verify-token"]), None)
    }

    fn change_password(
        &self,
        change: &PasswordChange,
    ) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        let url = self.endpoint(&["user", "change-password"]);
        async move {
            let request = self.authorized(Method::POST, url).await?.json(change);
            client::send(request, None).await?;
            Ok(())
        }
    }
}
