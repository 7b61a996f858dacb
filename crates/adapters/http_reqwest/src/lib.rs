//! # plugdash-adapter-http-reqwest
//!
//! REST client for the plug backend using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the backend port traits defined in `plugdash-app::ports`
//!   (`DeviceApi`, `AutomationApi`, `AuditApi`, `UsageApi`, `UserApi`)
//! - Attach the stored bearer token to every request
//! - Map 401 to `PlugDashError::Unauthorized`, 404 to `NotFound`, and
//!   decode FastAPI `{"detail": ...}` bodies for everything else
//!
//! ## Dependency rule
//! Depends on `plugdash-app` (for port traits) and `plugdash-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod audit;
mod automation;
mod client;
mod devices;
mod error;
mod usage;
mod user;

pub use client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, HttpApiClient};
pub use error::HttpError;
