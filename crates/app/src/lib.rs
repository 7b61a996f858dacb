//! # plugdash-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceApi`: list, update and toggle plugs, last usage snapshot
//!   - `AutomationApi`: CRUD and toggle for automation rules
//!   - `AuditApi`: audit trail and notifications
//!   - `UsageApi`: readings, summaries and carbon intensity
//!   - `UserApi`: login, token verification, password change
//!   - `TokenStore`: persistence of the bearer token
//! - Define **use-case services** (`DeviceService`, `AutomationService`, …)
//!   that validate locally before any request is made
//! - Provide **in-process infrastructure** that doesn't need IO: the
//!   [`auth::AuthSession`] verification cache and the [`poller::Poller`]
//!
//! ## Dependency rule
//! Depends on `plugdash-domain` only (plus `tokio` for sync, time and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod auth;
pub mod poller;
pub mod ports;
pub mod services;
