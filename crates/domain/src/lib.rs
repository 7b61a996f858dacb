//! # plugdash-domain
//!
//! Pure domain model for the plugdash smart-plug dashboard.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (smart plugs keyed by hardware name) and their power state
//! - Define **Automation rules** and the compact trigger value codec
//! - Define **Audit log** entries, **notifications** and client-side paging
//! - Define **Usage** readings, summaries and **carbon intensity** records
//! - Hourly **analytics** aggregation merging usage, carbon and price
//! - Account **credentials**, tokens and password change rules
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod analytics;
pub mod audit;
pub mod automation;
pub mod carbon;
pub mod device;
pub mod notification;
pub mod usage;
pub mod user;
