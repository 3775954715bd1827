// 🧭 Pipeline - Single entry point: raw notification in, outcome out
// Stateless composition of classifier, extractors, currency and categories

use tracing::debug;
use uuid::Uuid;

use crate::amount::AmountExtractor;
use crate::category::CategoryTable;
use crate::classifier::ClassifierRules;
use crate::currency::CurrencyTable;
use crate::merchant::MerchantExtractor;
use crate::notification::{
    ClassificationOutcome, NotificationKind, RawNotification, TransactionCandidate,
    TransactionKind, CANDIDATE_SOURCE,
};

// ============================================================================
// PIPELINE
// ============================================================================

/// The whole extraction pipeline, wired once and reused.
///
/// Holds only immutable rule tables, so a shared reference can classify
/// from any number of threads with no synchronization. Every invocation
/// takes its full context as explicit parameters; nothing is cached or
/// read from globals between calls.
pub struct Pipeline {
    rules: ClassifierRules,
    currencies: CurrencyTable,
    amounts: AmountExtractor,
    merchants: MerchantExtractor,
    categories: CategoryTable,
}

impl Pipeline {
    /// Wire a pipeline from externally loaded rule tables.
    pub fn new(rules: ClassifierRules, currencies: CurrencyTable, categories: CategoryTable) -> Self {
        let merchants = MerchantExtractor::new(&currencies);
        Pipeline {
            rules,
            currencies,
            amounts: AmountExtractor::new(),
            merchants,
            categories,
        }
    }

    /// Pipeline over the built-in rule tables.
    pub fn with_defaults() -> Self {
        Pipeline::new(
            ClassifierRules::with_defaults(),
            CurrencyTable::with_defaults(),
            CategoryTable::with_defaults(),
        )
    }

    pub fn currencies(&self) -> &CurrencyTable {
        &self.currencies
    }

    /// Classify one notification. Never errors: every input path ends in
    /// one of the four outcomes.
    ///
    /// Expense/Income classifications that fail amount extraction degrade
    /// to Unknown - "could not extract" is a terminal state, not a fault.
    pub fn classify(
        &self,
        notification: &RawNotification,
        auto_track_income: bool,
    ) -> ClassificationOutcome {
        let normalized = notification.normalized_text();
        let kind = self.rules.classify(&normalized, auto_track_income);
        debug!(source = %notification.source, kind = kind.as_str(), "notification classified");

        let kind = match kind {
            NotificationKind::Info => return ClassificationOutcome::Info,
            NotificationKind::Unknown => return ClassificationOutcome::Unknown,
            NotificationKind::Expense => TransactionKind::Expense,
            NotificationKind::Income => TransactionKind::Income,
        };

        // Symbol case matters for currency tokens: extract from raw text
        let raw = notification.text();
        let Some(extracted) = self.amounts.extract(&raw, &self.currencies) else {
            debug!(source = %notification.source, "amount extraction failed, degrading to Unknown");
            return ClassificationOutcome::Unknown;
        };

        let amount = self
            .currencies
            .to_base(extracted.value, &extracted.currency_code);

        // None here means no conversion occurred - audit display relies on it
        let (original_amount, original_currency) = if extracted.currency_code != self.currencies.base
        {
            (Some(extracted.value), Some(extracted.currency_code.clone()))
        } else {
            (None, None)
        };

        let merchant = self.merchants.extract(&raw);

        let category_input = match &merchant {
            Some(m) => format!("{} {}", normalized, m.to_lowercase()),
            None => normalized,
        };
        let category = self.categories.infer(&category_input).to_string();

        let candidate = TransactionCandidate {
            id: Uuid::new_v4().to_string(),
            amount,
            original_amount,
            original_currency,
            category,
            description: raw,
            kind,
            source: CANDIDATE_SOURCE.to_string(),
            merchant,
            timestamp: notification.timestamp,
        };

        match kind {
            TransactionKind::Expense => ClassificationOutcome::Expense(candidate),
            TransactionKind::Income => ClassificationOutcome::Income(candidate),
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// FEEDBACK MESSAGE
// ============================================================================

/// The short line handed to the local-notification collaborator after a
/// successful capture: what was spent where, and what is left of the
/// daily allowance. Only Expense/Income outcomes ever produce one.
pub fn feedback_message(
    candidate: &TransactionCandidate,
    remaining_allowance: f64,
    currencies: &CurrencyTable,
) -> String {
    let label = candidate
        .merchant
        .as_deref()
        .unwrap_or(&candidate.category);

    format!(
        "{}: {:.2} {} ({:.2} {} left today)",
        label, candidate.amount, currencies.base, remaining_allowance, currencies.base
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn notification(title: &str, body: &str) -> RawNotification {
        RawNotification::new(
            title,
            body,
            "rs.banka.app",
            Utc.with_ymd_and_hms(2024, 11, 2, 12, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_card_purchase_end_to_end() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Card payment", "Purchase at MAXI 1.234,56 RSD");

        let outcome = pipeline.classify(&n, false);
        let candidate = match &outcome {
            ClassificationOutcome::Expense(c) => c,
            other => panic!("expected Expense, got {:?}", other),
        };

        assert_eq!(candidate.amount, 1234.56);
        assert_eq!(candidate.merchant.as_deref(), Some("MAXI"));
        assert_eq!(candidate.category, "groceries");
        // Already base currency: no conversion recorded
        assert_eq!(candidate.original_amount, None);
        assert_eq!(candidate.original_currency, None);
        assert_eq!(candidate.kind, TransactionKind::Expense);
        assert_eq!(candidate.source, CANDIDATE_SOURCE);
    }

    #[test]
    fn test_salary_suppressed_when_opted_out() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Incoming transfer", "Salary 50.000,00 RSD");

        let outcome = pipeline.classify(&n, false);
        assert!(matches!(outcome, ClassificationOutcome::Info));
    }

    #[test]
    fn test_salary_tracked_when_opted_in() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Incoming transfer", "Salary 50.000,00 RSD");

        let outcome = pipeline.classify(&n, true);
        let candidate = match &outcome {
            ClassificationOutcome::Income(c) => c,
            other => panic!("expected Income, got {:?}", other),
        };
        assert_eq!(candidate.amount, 50_000.0);
        assert_eq!(candidate.kind, TransactionKind::Income);
    }

    #[test]
    fn test_balance_message_is_info() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Account balance", "Available balance: 12.345,00 RSD");

        let outcome = pipeline.classify(&n, false);
        assert!(matches!(outcome, ClassificationOutcome::Info));
    }

    #[test]
    fn test_promotional_text_is_unknown() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("", "Random promotional text");

        let outcome = pipeline.classify(&n, false);
        assert!(matches!(outcome, ClassificationOutcome::Unknown));
    }

    #[test]
    fn test_expense_without_amount_degrades_to_unknown() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Card payment", "Your card payment was declined");

        let outcome = pipeline.classify(&n, false);
        assert!(matches!(outcome, ClassificationOutcome::Unknown));
    }

    #[test]
    fn test_foreign_currency_preserves_original() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Card payment", "Card payment 10,00 EUR at ASOS");

        let outcome = pipeline.classify(&n, false);
        let candidate = outcome.candidate().expect("expense expected");

        assert!((candidate.amount - 1172.0).abs() < 1e-9);
        assert_eq!(candidate.original_amount, Some(10.0));
        assert_eq!(candidate.original_currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_repeat_parse_agrees_except_id() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Card payment", "Purchase at MAXI 1.234,56 RSD");

        let a = pipeline.classify(&n, false);
        let b = pipeline.classify(&n, false);
        let (a, b) = (a.candidate().unwrap(), b.candidate().unwrap());

        assert!(a.fields_eq(b));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_determinism_of_outcome_kind() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Obavestenje", "Kupovina karticom 616,00 RSD LIDL");

        let first = pipeline.classify(&n, false).kind();
        for _ in 0..10 {
            assert_eq!(pipeline.classify(&n, false).kind(), first);
        }
    }

    #[test]
    fn test_feedback_message_prefers_merchant() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Card payment", "Purchase at MAXI 1.234,56 RSD");

        let outcome = pipeline.classify(&n, false);
        let candidate = outcome.candidate().unwrap();

        let msg = feedback_message(candidate, 2765.44, pipeline.currencies());
        assert_eq!(msg, "MAXI: 1234.56 RSD (2765.44 RSD left today)");
    }

    #[test]
    fn test_feedback_message_falls_back_to_category() {
        let pipeline = Pipeline::with_defaults();
        let n = notification("Card payment", "Kupovina karticom 616,00 RSD");

        let outcome = pipeline.classify(&n, false);
        let candidate = outcome.candidate().unwrap();
        assert!(candidate.merchant.is_none());

        let msg = feedback_message(candidate, 1000.0, pipeline.currencies());
        assert!(msg.starts_with("other: 616.00 RSD"));
    }
}
