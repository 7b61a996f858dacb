//! # plugdash-adapter-token-fs
//!
//! Keeps the bearer token in a small file so that a login survives between
//! CLI invocations, the way the browser kept it in local storage.
//!
//! ## Dependency rule
//! Depends on `plugdash-app` (for the `TokenStore` port) and
//! `plugdash-domain` (for `AccessToken`).

mod error;
mod store;

pub use error::TokenStoreError;
pub use store::FileTokenStore;
