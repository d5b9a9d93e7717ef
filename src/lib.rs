//! qrmint - batch minting of unique short-URL QR codes
//!
//! This library generates QR-code label images for short URLs, allocates a
//! globally unique identifier for each one against a remote document
//! collection, and persists a uniqueness record per allocated code.
//!
//! # Features
//!
//! - **Identifier allocation**: random alphanumeric keys confirmed unused
//!   against the remote collection before they are handed out
//! - **Label rendering**: QR codes composed onto padded, bordered canvases
//!   in the printed-label layout
//! - **Pluggable store**: Firestore REST adapter for live runs, in-memory
//!   fake for tests and dry runs
//!
//! # Example
//!
//! ```no_run
//! use qrmint::{MintOptions, QrFlavor, QrMinter};
//! use qrmint::store::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> qrmint::Result<()> {
//!     let options = MintOptions::new(QrFlavor::Label, "https://example.com");
//!     let minter = QrMinter::new(MemoryStore::new(), options);
//!
//!     let minted = minter.mint_batch(3).await?;
//!     for qr in &minted {
//!         println!("Minted {} -> {}", qr.id, qr.url);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]

pub mod allocator;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod qr;
pub mod store;

// Re-exports for convenience
pub use error::{Error, Result};

pub use allocator::{CandidateSource, IdentifierAllocator, RandomCandidates, ScriptedCandidates};
pub use config::{LogRotation, LoggingOptions, MintSettings, OutputOptions, QrmintConfig};
pub use qr::{CanvasLayout, QrEncoder};
pub use store::{DocumentStore, QrRecord};

use std::path::PathBuf;

/// The two QR flavors the batch tool mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrFlavor {
    /// Plain label code: points at the public QR landing page, inactive
    /// until claimed.
    Label,
    /// Scan code: points at the scan interface, active from creation and
    /// recorded with its target URL.
    Scan,
}

impl QrFlavor {
    /// Collection the flavor's records are keyed under.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Label => "qrs",
            Self::Scan => "scan_qrs",
        }
    }

    /// File-name prefix, if the flavor carries one.
    pub fn file_prefix(&self) -> Option<&'static str> {
        match self {
            Self::Label => None,
            Self::Scan => Some("scan"),
        }
    }

    /// Target URL encoded into the QR code.
    pub fn target_url(&self, base_url: &str, id: &str) -> String {
        let base = base_url.trim_end_matches('/');
        match self {
            Self::Label => format!("{base}/qr/{id}"),
            Self::Scan => format!("{base}/scan?qrToken={id}"),
        }
    }

    fn canvas_layout(&self) -> CanvasLayout {
        match self {
            Self::Label => CanvasLayout::label(),
            Self::Scan => CanvasLayout::scan(),
        }
    }
}

/// Options controlling one minting batch.
#[derive(Debug, Clone)]
pub struct MintOptions {
    /// Which QR flavor to mint
    pub flavor: QrFlavor,
    /// Frontend base URL the codes point at
    pub base_url: String,
    /// Origin tag written into label records
    pub created_for: String,
    /// Identifier length in characters
    pub id_length: usize,
    /// Candidate attempts before the allocator gives up
    pub max_attempts: u32,
    /// Directory PNG artifacts are written into
    pub out_dir: PathBuf,
    /// When false, rendering and file writing are skipped entirely
    pub write_files: bool,
}

impl MintOptions {
    /// Options with the default id length, attempt cap, and output directory.
    pub fn new(flavor: QrFlavor, base_url: impl Into<String>) -> Self {
        Self {
            flavor,
            base_url: base_url.into(),
            created_for: "carevego".to_string(),
            id_length: allocator::DEFAULT_ID_LENGTH,
            max_attempts: allocator::DEFAULT_MAX_ATTEMPTS,
            out_dir: PathBuf::from("."),
            write_files: true,
        }
    }

    /// Build options from loaded configuration and a flavor choice.
    pub fn from_config(config: &QrmintConfig, flavor: QrFlavor) -> Self {
        Self {
            flavor,
            base_url: config.mint.base_url.clone(),
            created_for: config.mint.created_for.clone(),
            id_length: config.mint.id_length,
            max_attempts: config.mint.max_attempts,
            out_dir: config.output.dir.clone(),
            write_files: true,
        }
    }

    /// Override the origin tag written into records.
    pub fn with_created_for(mut self, created_for: impl Into<String>) -> Self {
        self.created_for = created_for.into();
        self
    }

    /// Skip rendering and file writing; allocate and insert records only.
    pub fn without_files(mut self) -> Self {
        self.write_files = false;
        self
    }
}

/// One successfully minted QR code.
#[derive(Debug, Clone)]
pub struct MintedQr {
    /// The allocated identifier
    pub id: String,
    /// The target URL encoded into the code
    pub url: String,
    /// Path of the written PNG, when file writing was enabled
    pub file: Option<PathBuf>,
}

/// High-level batch driver combining allocator, renderer, and store.
pub struct QrMinter<S: DocumentStore> {
    store: S,
    options: MintOptions,
    encoder: QrEncoder,
}

impl<S: DocumentStore> QrMinter<S> {
    /// Create a minter over the given store.
    pub fn new(store: S, options: MintOptions) -> Self {
        Self {
            store,
            options,
            encoder: QrEncoder::new(),
        }
    }

    /// Access the underlying store, e.g. to inspect records after a dry run.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mint `count` codes sequentially with the live random candidate source.
    ///
    /// A store failure aborts the batch; codes minted before the failure stay
    /// written and recorded (the collection is append-only, nothing is rolled
    /// back).
    pub async fn mint_batch(&self, count: u32) -> Result<Vec<MintedQr>> {
        let source = RandomCandidates::new();
        self.mint_batch_with(count, source).await
    }

    /// Mint `count` codes drawing candidates from an explicit source.
    pub async fn mint_batch_with<C: CandidateSource>(
        &self,
        count: u32,
        source: C,
    ) -> Result<Vec<MintedQr>> {
        let mut allocator = IdentifierAllocator::new(source)
            .with_length(self.options.id_length)
            .with_max_attempts(self.options.max_attempts);

        let mut minted = Vec::with_capacity(count as usize);
        for index in 0..count {
            let qr = self.mint_one(&mut allocator).await?;
            tracing::info!(id = %qr.id, n = index + 1, of = count, "Minted QR code");
            minted.push(qr);
        }
        Ok(minted)
    }

    async fn mint_one<C: CandidateSource>(
        &self,
        allocator: &mut IdentifierAllocator<C>,
    ) -> Result<MintedQr> {
        let flavor = self.options.flavor;
        let collection = flavor.collection();

        let id = allocator.allocate(&self.store, collection).await?;
        let url = flavor.target_url(&self.options.base_url, &id);
        let now = store::ist_now();

        // Render and write the artifact before claiming the identifier, the
        // same order the original batch ran in.
        let file = if self.options.write_files {
            let qr_image = self.encoder.encode(&url)?;
            let canvas = qr::canvas::compose(&qr_image, &flavor.canvas_layout());
            let name = output::artifact_name(flavor.file_prefix(), now.date_naive(), &id);
            Some(output::write_png(&self.options.out_dir, &name, &canvas)?)
        } else {
            None
        };

        let record = self.build_record(&id, &url, now);
        self.store.insert(collection, &id, &record).await?;

        Ok(MintedQr { id, url, file })
    }

    fn build_record(
        &self,
        id: &str,
        url: &str,
        now: chrono::DateTime<chrono::FixedOffset>,
    ) -> QrRecord {
        match self.options.flavor {
            QrFlavor::Label => QrRecord {
                id: id.to_string(),
                is_active: false,
                created_for: self.options.created_for.clone(),
                created_time: now,
                kind: None,
                url: None,
            },
            QrFlavor::Scan => QrRecord {
                id: id.to_string(),
                is_active: true,
                created_for: "scan_functionality".to_string(),
                created_time: now,
                kind: Some("scan_qr".to_string()),
                url: Some(url.to_string()),
            },
        }
    }
}
