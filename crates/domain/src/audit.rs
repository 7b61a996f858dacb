//! Audit log entries and client-side paging.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::id::AuditLogId;
use crate::time::{self, Timestamp};

/// Rows shown per audit page.
pub const AUDIT_PAGE_SIZE: usize = 15;

/// One record of who did what to which device. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    #[serde(with = "time::lenient")]
    pub timestamp: Timestamp,
    pub user_id: i64,
    pub action_type: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub device: String,
}

/// Device filter and requested page (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub device: Option<String>,
    pub page: usize,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            device: None,
            page: 1,
        }
    }
}

impl AuditQuery {
    /// Change the device filter. Always goes back to the first page.
    pub fn set_device(&mut self, device: Option<String>) {
        self.device = device;
        self.page = 1;
    }

    /// Jump to `page`, clamped to `1..=total_pages`.
    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.page = page.clamp(1, total_pages.max(1));
    }

    fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.device.as_deref().is_none_or(|device| entry.device == device)
    }
}

/// A slice of the filtered audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPage<'a> {
    pub items: Vec<&'a AuditLogEntry>,
    pub page: usize,
    pub total_pages: usize,
    /// Zero-based index of the first item on this page.
    pub start_index: usize,
    /// Exclusive end index.
    pub end_index: usize,
    pub total_items: usize,
}

impl<'a> AuditPage<'a> {
    /// Filter `entries` by the query's device and cut out the requested page.
    ///
    /// An empty result still reports page 1 of 1.
    #[must_use]
    pub fn paginate(entries: &'a [AuditLogEntry], query: &AuditQuery) -> Self {
        let filtered: Vec<&AuditLogEntry> =
            entries.iter().filter(|entry| query.matches(entry)).collect();
        let total_items = filtered.len();
        let total_pages = total_items.div_ceil(AUDIT_PAGE_SIZE).max(1);
        let mut position = query.clone();
        position.go_to(query.page, total_pages);
        let page = position.page;
        let start_index = (page - 1) * AUDIT_PAGE_SIZE;
        let end_index = (start_index + AUDIT_PAGE_SIZE).min(total_items);
        let items = filtered
            .get(start_index..end_index)
            .map(<[_]>::to_vec)
            .unwrap_or_default();
        Self {
            items,
            page,
            total_pages,
            start_index,
            end_index,
            total_items,
        }
    }
}

/// Devices that appear in the log, sorted and deduplicated.
#[must_use]
pub fn distinct_devices(entries: &[AuditLogEntry]) -> Vec<String> {
    entries
        .iter()
        .filter(|entry| !entry.device.is_empty())
        .map(|entry| entry.device.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(id: i64, device: &str) -> AuditLogEntry {
        AuditLogEntry {
            id: AuditLogId::new(id),
            timestamp: Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap(),
            user_id: 1,
            action_type: "TOGGLE_POWER".to_string(),
            details: String::new(),
            log: format!("entry {id}"),
            device: device.to_string(),
        }
    }

    fn log(count: i64) -> Vec<AuditLogEntry> {
        (1..=count)
            .map(|id| entry(id, if id % 2 == 0 { "device2" } else { "device1" }))
            .collect()
    }

    #[test]
    fn should_split_into_pages_of_fifteen() {
        let entries = log(40);
        let page = AuditPage::paginate(&entries, &AuditQuery::default());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items.len(), 15);
        assert_eq!((page.start_index, page.end_index), (0, 15));

        let last = AuditPage::paginate(
            &entries,
            &AuditQuery {
                device: None,
                page: 3,
            },
        );
        assert_eq!(last.items.len(), 10);
        assert_eq!((last.start_index, last.end_index), (30, 40));
    }

    #[test]
    fn should_clamp_page_past_the_end() {
        let entries = log(20);
        let page = AuditPage::paginate(
            &entries,
            &AuditQuery {
                device: None,
                page: 9,
            },
        );
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 5);
    }

    #[test]
    fn should_report_single_empty_page_when_no_entries() {
        let page = AuditPage::paginate(&[], &AuditQuery::default());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn should_filter_by_device() {
        let entries = log(10);
        let query = AuditQuery {
            device: Some("device2".to_string()),
            page: 1,
        };
        let page = AuditPage::paginate(&entries, &query);
        assert_eq!(page.total_items, 5);
        assert!(page.items.iter().all(|e| e.device == "device2"));
    }

    #[test]
    fn should_reset_to_first_page_when_filter_changes() {
        let mut query = AuditQuery::default();
        query.go_to(3, 5);
        assert_eq!(query.page, 3);
        query.set_device(Some("device1".to_string()));
        assert_eq!(query.page, 1);
    }

    #[test]
    fn should_list_distinct_devices_sorted() {
        let entries = vec![entry(1, "b"), entry(2, "a"), entry(3, "b"), entry(4, "")];
        assert_eq!(distinct_devices(&entries), vec!["a", "b"]);
    }

    #[test]
    fn should_deserialize_naive_backend_timestamp() {
        let json = serde_json::json!({
            "id": 3,
            "timestamp": "2024-12-01T12:00:00",
            "user_id": 1,
            "action_type": "LOGIN",
            "details": "",
            "log": "User logged in",
            "device": ""
        });
        let entry: AuditLogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap()
        );
    }
}
