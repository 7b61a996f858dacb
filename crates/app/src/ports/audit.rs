//! Audit port: the user's audit trail and notifications.

use std::future::Future;

use plugdash_domain::audit::AuditLogEntry;
use plugdash_domain::error::PlugDashError;
use plugdash_domain::notification::Notification;

pub trait AuditApi {
    fn audit_logs(&self) -> impl Future<Output = Result<Vec<AuditLogEntry>, PlugDashError>> + Send;

    fn notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<Notification>, PlugDashError>> + Send;

    fn mark_notifications_read(&self) -> impl Future<Output = Result<(), PlugDashError>> + Send;
}

impl<T: AuditApi + Send + Sync> AuditApi for std::sync::Arc<T> {
    fn audit_logs(&self) -> impl Future<Output = Result<Vec<AuditLogEntry>, PlugDashError>> + Send {
        (**self).audit_logs()
    }

    fn notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<Notification>, PlugDashError>> + Send {
        (**self).notifications()
    }

    fn mark_notifications_read(&self) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        (**self).mark_notifications_read()
    }
}
