//! Port definitions: traits that adapters implement.
//!
//! Every remote resource the dashboard reads or drives has its own port, so
//! services depend on exactly the calls they make. The REST adapter
//! implements all of them on one client.

pub mod audit;
pub mod automation;
pub mod devices;
pub mod token_store;
pub mod usage;
pub mod user;

pub use audit::AuditApi;
pub use automation::AutomationApi;
pub use devices::DeviceApi;
pub use token_store::TokenStore;
pub use usage::UsageApi;
pub use user::UserApi;
