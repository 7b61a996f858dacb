//! Token store port: where the bearer token survives between runs.

use std::future::Future;

use plugdash_domain::error::PlugDashError;
use plugdash_domain::user::AccessToken;

/// Persistent slot holding at most one access token.
///
/// The HTTP adapter reads it before every request, so a token saved by a
/// login is picked up without rebuilding the client.
pub trait TokenStore {
    fn load(&self) -> impl Future<Output = Result<Option<AccessToken>, PlugDashError>> + Send;

    fn save(&self, token: &AccessToken) -> impl Future<Output = Result<(), PlugDashError>> + Send;

    /// Remove the token. Clearing an empty store succeeds.
    fn clear(&self) -> impl Future<Output = Result<(), PlugDashError>> + Send;
}

impl<T: TokenStore + Send + Sync> TokenStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Option<AccessToken>, PlugDashError>> + Send {
        (**self).load()
    }

    fn save(&self, token: &AccessToken) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        (**self).save(token)
    }

    fn clear(&self) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        (**self).clear()
    }
}
