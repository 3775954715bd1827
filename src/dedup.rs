// 🔂 Deduplicator - Time-windowed duplicate suppression per source
// One logical writer per source: check the window, then insert, serialized

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::notification::TransactionCandidate;

/// Trailing window within which a second capture from the same source is
/// treated as a duplicate of an already-recorded event.
pub const DEFAULT_WINDOW_MINUTES: i64 = 5;

/// Bound on how many prior captures a window query returns.
pub const DEFAULT_QUERY_LIMIT: usize = 10;

// ============================================================================
// WINDOW QUERY SHAPE
// ============================================================================

/// The query the persistence collaborator answers before committing a
/// candidate: captures from `source` at or after `since`, most recent
/// first, at most `limit` of them.
///
/// The window is a sliding half-open interval [now - W, now): the lower
/// bound is inclusive, so a capture exactly W ago is still inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowQuery {
    pub source: String,
    pub since: DateTime<Utc>,
    pub limit: usize,
}

impl WindowQuery {
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.since
    }
}

/// Summary of a committed capture, as returned by window queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorCapture {
    pub source: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// CAPTURE STORE SEAM
// ============================================================================

/// What the pipeline needs from the persistence collaborator: insert a
/// candidate, and answer the window query. The real implementation lives
/// with the host app's storage; the in-memory one backs tests.
pub trait CaptureStore: Send + Sync {
    /// Prior captures matching the query, most recent first, bounded.
    fn recent_by_source(&self, query: &WindowQuery) -> Vec<PriorCapture>;

    /// Record a committed candidate under its notification source.
    fn insert(&self, source: &str, candidate: &TransactionCandidate);
}

/// In-memory capture store.
pub struct MemoryCaptureStore {
    captures: Mutex<Vec<PriorCapture>>,
}

impl MemoryCaptureStore {
    pub fn new() -> Self {
        MemoryCaptureStore {
            captures: Mutex::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.captures.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCaptureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureStore for MemoryCaptureStore {
    fn recent_by_source(&self, query: &WindowQuery) -> Vec<PriorCapture> {
        let captures = self.captures.lock().unwrap();
        let mut hits: Vec<PriorCapture> = captures
            .iter()
            .filter(|c| c.source == query.source && query.contains(c.timestamp))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        hits.truncate(query.limit);
        hits
    }

    fn insert(&self, source: &str, candidate: &TransactionCandidate) {
        let mut captures = self.captures.lock().unwrap();
        captures.push(PriorCapture {
            source: source.to_string(),
            amount: candidate.amount,
            timestamp: candidate.timestamp,
        });
    }
}

// ============================================================================
// POLICY
// ============================================================================

/// Window-based, source-only suppression policy.
///
/// ANY prior capture from the same source inside the window suppresses the
/// new candidate; amounts and descriptions are not compared. Two distinct
/// purchases within the window therefore collapse into one capture.
/// Widening the comparison is a product decision (see DESIGN.md).
#[derive(Debug, Clone)]
pub struct DedupPolicy {
    pub window: Duration,
}

impl DedupPolicy {
    pub fn new(window: Duration) -> Self {
        DedupPolicy { window }
    }

    /// The window query for a commit happening at `now`.
    pub fn window_query(&self, source: &str, now: DateTime<Utc>) -> WindowQuery {
        WindowQuery {
            source: source.to_string(),
            since: now - self.window,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }

    pub fn is_duplicate(&self, prior: &[PriorCapture]) -> bool {
        !prior.is_empty()
    }
}

impl Default for DedupPolicy {
    fn default() -> Self {
        DedupPolicy::new(Duration::minutes(DEFAULT_WINDOW_MINUTES))
    }
}

// ============================================================================
// PER-SOURCE COMMIT GATE
// ============================================================================

/// Outcome of a gated commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Suppressed,
}

/// Serializes check-window-then-insert per source key.
///
/// Two notifications from the same app arriving a few hundred milliseconds
/// apart must not both read "no prior capture" and both commit. One mutex
/// per source keeps unrelated sources fully concurrent; a global lock
/// would not.
pub struct SourceGate {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SourceGate {
    pub fn new() -> Self {
        SourceGate {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, source: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap();
        locks
            .entry(source.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Commit `candidate` under `source` unless the window already holds a
    /// capture from that source. The whole check-then-insert runs under the
    /// source's lock.
    pub fn commit(
        &self,
        store: &dyn CaptureStore,
        policy: &DedupPolicy,
        source: &str,
        candidate: &TransactionCandidate,
        now: DateTime<Utc>,
    ) -> CommitOutcome {
        let gate = self.lock_for(source);
        let _guard = gate.lock().unwrap();

        let query = policy.window_query(source, now);
        let prior = store.recent_by_source(&query);

        if policy.is_duplicate(&prior) {
            debug!(source, prior = prior.len(), "candidate suppressed as duplicate");
            return CommitOutcome::Suppressed;
        }

        store.insert(source, candidate);
        debug!(source, amount = candidate.amount, "candidate committed");
        CommitOutcome::Committed
    }
}

impl Default for SourceGate {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
