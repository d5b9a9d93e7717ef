//! Identifier allocation against a remote collection
//!
//! The one invariant in this system lives here: every identifier handed out
//! is unused in its collection at the moment the existence check ran. There
//! is no transactional guard between that check and the caller's insert; with
//! a 62^8 keyspace and single-digit batch sizes the collision window is
//! accepted.

use crate::error::{Error, Result};
use crate::store::DocumentStore;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// The 62-symbol alphabet identifiers are drawn from.
pub const ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Default identifier length.
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Default cap on candidates tried before giving up with
/// [`Error::KeyspaceExhausted`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Produces candidate identifiers of a requested length.
///
/// Injected into the allocator so tests can substitute a deterministic
/// sequence for the random source.
pub trait CandidateSource: Send {
    /// Produce the next candidate of exactly `length` characters.
    fn next_candidate(&mut self, length: usize) -> String;
}

/// Live candidate source sampling uniformly from [`ALPHABET`].
pub struct RandomCandidates<R: Rng> {
    rng: R,
}

impl RandomCandidates<StdRng> {
    /// Create a source seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for RandomCandidates<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomCandidates<R> {
    /// Create a source backed by an explicit RNG instance, e.g. a seeded
    /// `StdRng` for reproducible output.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + Send> CandidateSource for RandomCandidates<R> {
    fn next_candidate(&mut self, length: usize) -> String {
        (0..length)
            .map(|_| {
                let index = self.rng.random_range(0..ALPHABET.len());
                ALPHABET[index] as char
            })
            .collect()
    }
}

/// Deterministic candidate source replaying a fixed script.
///
/// Panics if drained; only meant for tests and replay harnesses where the
/// script is known to cover every draw.
pub struct ScriptedCandidates {
    script: VecDeque<String>,
}

impl ScriptedCandidates {
    /// Build a source yielding the given candidates in order.
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: candidates.into_iter().map(Into::into).collect(),
        }
    }
}

impl CandidateSource for ScriptedCandidates {
    fn next_candidate(&mut self, _length: usize) -> String {
        self.script
            .pop_front()
            .expect("scripted candidate source drained")
    }
}

/// Allocates previously-unused identifiers within a named collection.
pub struct IdentifierAllocator<C> {
    source: C,
    length: usize,
    max_attempts: u32,
}

impl<C: CandidateSource> IdentifierAllocator<C> {
    /// Create an allocator with the default length and attempt cap.
    pub fn new(source: C) -> Self {
        Self {
            source,
            length: DEFAULT_ID_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the identifier length.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Override the candidate attempt cap.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Return the first candidate the store reports as absent.
    ///
    /// The allocator itself writes nothing; the caller is responsible for
    /// inserting the record that claims the identifier. Store failures
    /// propagate immediately and abort the batch.
    pub async fn allocate(
        &mut self,
        store: &dyn DocumentStore,
        collection: &str,
    ) -> Result<String> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.source.next_candidate(self.length);
            debug_assert_eq!(candidate.len(), self.length);

            if store.exists(collection, &candidate).await? {
                tracing::debug!(collection, %candidate, attempt, "Identifier collision, retrying");
                continue;
            }

            return Ok(candidate);
        }

        Err(Error::KeyspaceExhausted {
            collection: collection.to_string(),
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore, QrRecord, ist_now};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wrapper counting existence checks against an inner store.
    struct CountingStore<S> {
        inner: S,
        checks: AtomicUsize,
    }

    impl<S> CountingStore<S> {
        fn new(inner: S) -> Self {
            Self {
                inner,
                checks: AtomicUsize::new(0),
            }
        }

        fn checks(&self) -> usize {
            self.checks.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<S: DocumentStore> DocumentStore for CountingStore<S> {
        async fn exists(&self, collection: &str, id: &str) -> crate::Result<bool> {
            self.checks.fetch_add(1, Ordering::SeqCst);
            self.inner.exists(collection, id).await
        }

        async fn insert(
            &self,
            collection: &str,
            id: &str,
            record: &QrRecord,
        ) -> crate::Result<()> {
            self.inner.insert(collection, id, record).await
        }
    }

    fn record(id: &str) -> QrRecord {
        QrRecord {
            id: id.to_string(),
            is_active: false,
            created_for: "test".to_string(),
            created_time: ist_now(),
            kind: None,
            url: None,
        }
    }

    #[test]
    fn random_candidates_match_length_and_alphabet() {
        let mut source = RandomCandidates::with_rng(StdRng::seed_from_u64(7));
        for _ in 0..100 {
            let candidate = source.next_candidate(8);
            assert_eq!(candidate.len(), 8);
            assert!(candidate.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = RandomCandidates::with_rng(StdRng::seed_from_u64(42));
        let mut b = RandomCandidates::with_rng(StdRng::seed_from_u64(42));
        assert_eq!(a.next_candidate(8), b.next_candidate(8));
    }

    #[tokio::test]
    async fn empty_store_allocates_on_first_candidate() {
        let store = CountingStore::new(MemoryStore::new());
        let source = ScriptedCandidates::new(["AB12cd34"]);
        let mut allocator = IdentifierAllocator::new(source);

        let id = allocator.allocate(&store, "qrs").await.unwrap();
        assert_eq!(id, "AB12cd34");
        assert_eq!(store.checks(), 1);
    }

    #[tokio::test]
    async fn collisions_advance_to_next_candidate() {
        let store = CountingStore::new(MemoryStore::with_existing(
            "qrs",
            vec!["AB12cd34".to_string()],
        ));
        let source = ScriptedCandidates::new(["AB12cd34", "Zz99Aa00"]);
        let mut allocator = IdentifierAllocator::new(source);

        let id = allocator.allocate(&store, "qrs").await.unwrap();
        assert_eq!(id, "Zz99Aa00");
        assert_eq!(store.checks(), 2);
    }

    #[tokio::test]
    async fn k_collisions_mean_k_plus_one_checks() {
        let taken: Vec<String> = (0..5).map(|i| format!("taken00{i}")).collect();
        let store = CountingStore::new(MemoryStore::with_existing("qrs", taken.clone()));

        let mut script: Vec<String> = taken;
        script.push("freshId0".to_string());
        let mut allocator = IdentifierAllocator::new(ScriptedCandidates::new(script));

        let id = allocator.allocate(&store, "qrs").await.unwrap();
        assert_eq!(id, "freshId0");
        assert_eq!(store.checks(), 6);
    }

    #[tokio::test]
    async fn recorded_allocations_never_repeat() {
        let store = MemoryStore::new();
        let mut allocator =
            IdentifierAllocator::new(RandomCandidates::with_rng(StdRng::seed_from_u64(9)));

        let mut seen = Vec::new();
        for _ in 0..20 {
            let id = allocator.allocate(&store, "qrs").await.unwrap();
            store.insert("qrs", &id, &record(&id)).await.unwrap();
            assert!(!seen.contains(&id), "allocator repeated identifier {id}");
            seen.push(id);
        }
    }

    #[tokio::test]
    async fn exhausted_attempts_fail_with_dedicated_error() {
        let store = MemoryStore::with_existing("qrs", vec!["AB12cd34".to_string()]);
        let source = ScriptedCandidates::new(["AB12cd34", "AB12cd34", "AB12cd34"]);
        let mut allocator = IdentifierAllocator::new(source).with_max_attempts(3);

        let err = allocator.allocate(&store, "qrs").await.unwrap_err();
        match err {
            Error::KeyspaceExhausted {
                collection,
                attempts,
            } => {
                assert_eq!(collection, "qrs");
                assert_eq!(attempts, 3);
            }
            other => panic!("expected KeyspaceExhausted, got {other}"),
        }
    }
}
