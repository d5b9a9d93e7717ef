//! Firestore REST adapter for the document store trait

use crate::error::{Error, Result};
use crate::store::{DocumentStore, QrRecord};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Default public Firestore REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Live [`DocumentStore`] backed by the Firestore REST API.
///
/// Only the two point operations the allocator needs are implemented: a
/// document GET (404 means the key is free) and a `createDocument` with an
/// explicit `documentId`.
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    project: String,
    database: String,
    token: Option<String>,
}

impl FirestoreStore {
    /// Create an adapter against the given project's `(default)` database.
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            project: project.into(),
            database: "(default)".to_string(),
            token: None,
        }
    }

    /// Override the REST endpoint, e.g. to point at a local emulator.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Target a named database instead of `(default)`.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Attach an OAuth bearer token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents",
            self.base_url, self.project, self.database
        )
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    fn create_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}?documentId={}", self.documents_root(), collection, id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        let url = self.document_url(collection, id);
        let response = self.authorize(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(Error::Store(format!(
                "Existence check for '{}/{}' returned {}",
                collection, id, status
            ))),
        }
    }

    async fn insert(&self, collection: &str, id: &str, record: &QrRecord) -> Result<()> {
        let url = self.create_url(collection, id);
        let body = json!({ "fields": record_fields(record) });
        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(collection, id, "Inserted document");
            Ok(())
        } else {
            let detail = response.text().await.unwrap_or_default();
            Err(Error::Store(format!(
                "Insert of '{}/{}' returned {}: {}",
                collection, id, status, detail
            )))
        }
    }
}

/// Encode a record into Firestore's typed-value field map.
fn record_fields(record: &QrRecord) -> Value {
    // Firestore wants timestamps in RFC3339 Zulu form regardless of the
    // civil offset the record carries.
    let created = record
        .created_time
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Micros, true);

    let mut fields = json!({
        "id": { "stringValue": record.id },
        "isActive": { "booleanValue": record.is_active },
        "createdFor": { "stringValue": record.created_for },
        "createdTime": { "timestampValue": created },
    });

    if let Some(kind) = &record.kind {
        fields["type"] = json!({ "stringValue": kind });
    }
    if let Some(target) = &record.url {
        fields["url"] = json!({ "stringValue": target });
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ist_now;

    fn store() -> FirestoreStore {
        FirestoreStore::new("carevego-prod")
    }

    #[test]
    fn document_url_targets_default_database() {
        let url = store().document_url("qrs", "AB12cd34");
        assert_eq!(
            url,
            "https://firestore.googleapis.com/v1/projects/carevego-prod/databases/(default)/documents/qrs/AB12cd34"
        );
    }

    #[test]
    fn create_url_pins_document_id() {
        let url = store().create_url("scan_qrs", "Zz99Aa00");
        assert!(url.ends_with("/documents/scan_qrs?documentId=Zz99Aa00"));
    }

    #[test]
    fn base_url_override_applies() {
        let url = store()
            .with_base_url("http://localhost:8080/v1")
            .document_url("qrs", "x");
        assert!(url.starts_with("http://localhost:8080/v1/projects/"));
    }

    #[test]
    fn record_fields_use_typed_values() {
        let record = QrRecord {
            id: "AB12cd34".to_string(),
            is_active: false,
            created_for: "carevego".to_string(),
            created_time: ist_now(),
            kind: None,
            url: None,
        };

        let fields = record_fields(&record);
        assert_eq!(fields["id"]["stringValue"], "AB12cd34");
        assert_eq!(fields["isActive"]["booleanValue"], false);
        assert_eq!(fields["createdFor"]["stringValue"], "carevego");
        let ts = fields["createdTime"]["timestampValue"].as_str().unwrap();
        assert!(ts.ends_with('Z'), "timestamp must be Zulu form: {ts}");
        assert!(fields.get("type").is_none());
    }

    #[test]
    fn scan_record_fields_include_kind_and_url() {
        let record = QrRecord {
            id: "Zz99Aa00".to_string(),
            is_active: true,
            created_for: "scan_functionality".to_string(),
            created_time: ist_now(),
            kind: Some("scan_qr".to_string()),
            url: Some("https://example.com/scan?qrToken=Zz99Aa00".to_string()),
        };

        let fields = record_fields(&record);
        assert_eq!(fields["type"]["stringValue"], "scan_qr");
        assert_eq!(
            fields["url"]["stringValue"],
            "https://example.com/scan?qrToken=Zz99Aa00"
        );
    }
}
