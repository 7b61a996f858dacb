//! Audit service: audit trail and notifications.

use plugdash_domain::audit::AuditLogEntry;
use plugdash_domain::error::PlugDashError;
use plugdash_domain::notification::{self, Notification};

use crate::ports::AuditApi;

pub struct AuditService<A> {
    api: A,
}

impl<A: AuditApi> AuditService<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Propagates the backend error.
    #[tracing::instrument(skip(self))]
    pub async fn audit_logs(&self) -> Result<Vec<AuditLogEntry>, PlugDashError> {
        let mut entries = self.api.audit_logs().await?;
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// # Errors
    ///
    /// Propagates the backend error.
    #[tracing::instrument(skip(self))]
    pub async fn notifications(&self) -> Result<Vec<Notification>, PlugDashError> {
        self.api.notifications().await
    }

    /// Mark everything read on the backend, then return the updated list.
    ///
    /// # Errors
    ///
    /// Propagates the backend error; nothing is marked locally on failure.
    #[tracing::instrument(skip(self))]
    pub async fn mark_all_read(&self) -> Result<Vec<Notification>, PlugDashError> {
        let mut notifications = self.api.notifications().await?;
        self.api.mark_notifications_read().await?;
        notification::mark_all_read(&mut notifications);
        Ok(notifications)
    }
}
