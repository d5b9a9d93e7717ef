//! Remote document store abstraction
//!
//! The allocator and batch driver only ever need two point operations against
//! a named collection: an existence check by key and an insert by key. Both
//! are expressed through the [`DocumentStore`] trait so the live Firestore
//! adapter and the in-memory fake are interchangeable.

mod firestore;
mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Point access to a remote keyed collection.
///
/// Implementations must provide read-after-write consistency on a single key;
/// no transactional guard spans `exists` and `insert`, so the window between
/// them is an accepted race at the expected call volume.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check whether `id` already keys a record in `collection`.
    async fn exists(&self, collection: &str, id: &str) -> Result<bool>;

    /// Insert `record` under `id` in `collection`.
    ///
    /// Records are append-only from this system's perspective; nothing here
    /// ever updates or deletes one.
    async fn insert(&self, collection: &str, id: &str, record: &QrRecord) -> Result<()>;
}

/// Persisted metadata for one allocated identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrRecord {
    /// The allocated identifier, duplicated into the document body
    pub id: String,
    /// Whether the code is live; label codes start inactive, scan codes active
    pub is_active: bool,
    /// Origin tag naming what the code was created for
    pub created_for: String,
    /// Creation time, fixed to the IST civil timezone
    pub created_time: DateTime<FixedOffset>,
    /// Record kind discriminator, only present on scan records
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Target URL, only present on scan records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Offset of Indian Standard Time (UTC+05:30) in seconds.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Current wall-clock time in IST, the civil timezone the records use.
pub fn ist_now() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(IST_OFFSET_SECS).expect("IST offset is in range");
    Utc::now().with_timezone(&offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ist_now_carries_fixed_offset() {
        let now = ist_now();
        assert_eq!(now.offset().local_minus_utc(), 19_800);
    }

    #[test]
    fn record_serializes_with_document_field_names() {
        let record = QrRecord {
            id: "AB12cd34".to_string(),
            is_active: false,
            created_for: "carevego".to_string(),
            created_time: ist_now(),
            kind: None,
            url: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["id"], "AB12cd34");
        assert_eq!(obj["isActive"], false);
        assert_eq!(obj["createdFor"], "carevego");
        assert!(obj.contains_key("createdTime"));
        // Optional scan-only fields are omitted entirely on label records
        assert!(!obj.contains_key("type"));
        assert!(!obj.contains_key("url"));
    }

    #[test]
    fn scan_record_carries_kind_and_url() {
        let record = QrRecord {
            id: "Zz99Aa00".to_string(),
            is_active: true,
            created_for: "scan_functionality".to_string(),
            created_time: ist_now(),
            kind: Some("scan_qr".to_string()),
            url: Some("https://example.com/scan?qrToken=Zz99Aa00".to_string()),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "scan_qr");
        assert_eq!(value["url"], "https://example.com/scan?qrToken=Zz99Aa00");
    }
}
