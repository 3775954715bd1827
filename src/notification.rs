// 📩 Notification Model - Raw input and classification outcomes
// One RawNotification in, one ClassificationOutcome out, nothing retained

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source tag stamped on every candidate produced by this pipeline.
pub const CANDIDATE_SOURCE: &str = "notification-derived";

// ============================================================================
// RAW NOTIFICATION
// ============================================================================

/// RawNotification - One incoming banking notification, as delivered by the
/// system observation layer. Ephemeral: created per event, consumed once by
/// the pipeline, never persisted or mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNotification {
    /// Notification title (e.g., "Card payment")
    pub title: String,

    /// Notification body (e.g., "Purchase at MAXI 1.234,56 RSD")
    pub body: String,

    /// Source application identifier (package name of the banking app)
    pub source: String,

    /// Arrival timestamp
    pub timestamp: DateTime<Utc>,
}

impl RawNotification {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        source: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        RawNotification {
            title: title.into(),
            body: body.into(),
            source: source.into(),
            timestamp,
        }
    }

    /// Title and body joined, original casing preserved.
    /// Amount extraction works on this form (currency symbols are
    /// case-sensitive tokens).
    pub fn text(&self) -> String {
        if self.title.is_empty() {
            self.body.clone()
        } else if self.body.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.body)
        }
    }

    /// Lower-cased title + body, the form keyword tiers match against.
    pub fn normalized_text(&self) -> String {
        self.text().to_lowercase()
    }
}

// ============================================================================
// CLASSIFICATION KINDS
// ============================================================================

/// NotificationKind - Classifier verdict, before any extraction happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Expense,
    Income,
    Info,
    Unknown,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Expense => "Expense",
            NotificationKind::Income => "Income",
            NotificationKind::Info => "Info",
            NotificationKind::Unknown => "Unknown",
        }
    }
}

/// TransactionKind - Direction of money on a committed-to candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

// ============================================================================
// TRANSACTION CANDIDATE
// ============================================================================

/// TransactionCandidate - A fully extracted, not-yet-persisted transaction.
///
/// Identity: `id` (UUID, generated per extraction) - never compared when
/// checking whether two parses of the same text agree.
/// Values: everything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCandidate {
    /// Generated identity, unique per extraction
    pub id: String,

    /// Amount in the base currency
    pub amount: f64,

    /// Amount as it appeared in the notification, only when the original
    /// currency differs from base. None = no conversion occurred.
    pub original_amount: Option<f64>,

    /// Currency code the amount was originally denominated in, only when it
    /// differs from base. Paired with `original_amount` for audit display.
    pub original_currency: Option<String>,

    /// Inferred spending category tag
    pub category: String,

    /// Free-text description (the notification text that produced this)
    pub description: String,

    /// Expense or Income
    pub kind: TransactionKind,

    /// Always "notification-derived" for candidates from this pipeline
    pub source: String,

    /// Short merchant label, when one could be extracted
    pub merchant: Option<String>,

    /// Arrival timestamp of the originating notification
    pub timestamp: DateTime<Utc>,
}

impl TransactionCandidate {
    /// Field-wise equality ignoring the generated `id`.
    /// Two parses of identical text at the same timestamp must agree here.
    pub fn fields_eq(&self, other: &TransactionCandidate) -> bool {
        self.amount == other.amount
            && self.original_amount == other.original_amount
            && self.original_currency == other.original_currency
            && self.category == other.category
            && self.description == other.description
            && self.kind == other.kind
            && self.source == other.source
            && self.merchant == other.merchant
            && self.timestamp == other.timestamp
    }
}

// ============================================================================
// CLASSIFICATION OUTCOME
// ============================================================================

/// ClassificationOutcome - Final pipeline result, exactly one tag active.
/// Produced fresh per invocation; never merged or accumulated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassificationOutcome {
    /// Spend recognized and extracted
    Expense(TransactionCandidate),

    /// Inflow recognized and extracted (auto-track income enabled)
    Income(TransactionCandidate),

    /// Recognized but informational - balance, OTP, reminder, or an inflow
    /// the user opted out of tracking. Silent by design.
    Info,

    /// Nothing recognizable, or extraction failed after classification
    Unknown,
}

impl ClassificationOutcome {
    /// The candidate carried by Expense/Income, if any
    pub fn candidate(&self) -> Option<&TransactionCandidate> {
        match self {
            ClassificationOutcome::Expense(c) | ClassificationOutcome::Income(c) => Some(c),
            _ => None,
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            ClassificationOutcome::Expense(_) => NotificationKind::Expense,
            ClassificationOutcome::Income(_) => NotificationKind::Income,
            ClassificationOutcome::Info => NotificationKind::Info,
            ClassificationOutcome::Unknown => NotificationKind::Unknown,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
