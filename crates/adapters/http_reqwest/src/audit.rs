//! [`AuditApi`] over `/user/audit` and `/user/notifications`.

use std::future::Future;

use reqwest::Method;

use plugdash_app::ports::{AuditApi, TokenStore};
use plugdash_domain::audit::AuditLogEntry;
use plugdash_domain::error::PlugDashError;
use plugdash_domain::notification::Notification;

use crate::client::HttpApiClient;

impl<T: TokenStore + Sync> AuditApi for HttpApiClient<T> {
    fn audit_logs(&self) -> impl Future<Output = Result<Vec<AuditLogEntry>, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["user", "audit"]), None)
    }

    fn notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<Notification>, PlugDashError>> + Send {
        self.get_json(self.endpoint(&["user", "notifications"]), None)
    }

    fn mark_notifications_read(&self) -> impl Future<Output = Result<(), PlugDashError>> + Send {
        let url = self.endpoint(&["user", "notifications", "mark-all-read"]);
        self.send_empty(Method::POST, url, None)
    }
}
