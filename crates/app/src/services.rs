//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod analytics_service;
pub mod audit_service;
pub mod automation_service;
pub mod device_service;
pub mod user_service;

pub use analytics_service::{AnalyticsService, DashboardSummary};
pub use audit_service::AuditService;
pub use automation_service::AutomationService;
pub use device_service::DeviceService;
pub use user_service::UserService;
