// Spend Capture - Core Library
// Banking-notification classification and extraction pipeline

pub mod notification;
pub mod currency;
pub mod classifier;
pub mod amount;
pub mod merchant;
pub mod category;
pub mod dedup;
pub mod pipeline;

// Re-export commonly used types
pub use notification::{
    ClassificationOutcome, NotificationKind, RawNotification, TransactionCandidate,
    TransactionKind, CANDIDATE_SOURCE,
};
pub use currency::{Currency, CurrencyTable, BASE_CURRENCY};
pub use classifier::ClassifierRules;
pub use amount::{parse_localized, AmountExtractor, ExtractedAmount};
pub use merchant::{MerchantExtractor, MAX_MERCHANT_LEN, MIN_MERCHANT_LEN};
pub use category::{CategoryGroup, CategoryTable};
pub use dedup::{
    CaptureStore, CommitOutcome, DedupPolicy, MemoryCaptureStore, PriorCapture, SourceGate,
    WindowQuery, DEFAULT_QUERY_LIMIT, DEFAULT_WINDOW_MINUTES,
};
pub use pipeline::{feedback_message, Pipeline};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
