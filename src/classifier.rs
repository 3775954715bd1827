// 🏷️ Classifier - Three-tier keyword priority engine
// Expense beats income beats info; first tier with a hit decides

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::notification::NotificationKind;

// ============================================================================
// RULE TABLE
// ============================================================================

/// Keyword lists for the three classification tiers, evaluated in fixed
/// priority order: expense, income, info.
///
/// Rules as data: ship `with_defaults()` for the locale the source system
/// speaks, load per-institution overrides from JSON with `from_file`.
/// Matching is plain substring over the lower-cased notification text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules {
    /// Expense-indicating terms: card usage, purchase, payment, outflow,
    /// withdrawal, POS/ATM, fee/commission. Any hit wins outright, even
    /// when income or balance terms are present in the same message.
    pub expense: Vec<String>,

    /// Income-indicating terms: salary, incoming transfer, refund, deposit
    pub income: Vec<String>,

    /// Informational terms: balance, reminder, OTP/verification, activation
    pub info: Vec<String>,
}

impl ClassifierRules {
    /// Serbian + English banking vocabulary of the supported institutions.
    pub fn with_defaults() -> Self {
        ClassifierRules {
            expense: strings(&[
                "kupovina",
                "plaćanje",
                "placanje",
                "kartica",
                "karticom",
                "pos ",
                "atm",
                "bankomat",
                "isplata",
                "naknada",
                "provizija",
                "card payment",
                "card usage",
                "purchase",
                "payment",
                "debited",
                "withdrawal",
                "spent",
                "fee",
                "commission",
            ]),
            income: strings(&[
                "uplata",
                "priliv",
                "plata",
                "zarada",
                "povrat",
                "povraćaj",
                "salary",
                "incoming transfer",
                "refund",
                "reversal",
                "deposit",
                "credited",
            ]),
            info: strings(&[
                "stanje",
                "raspoloživo",
                "raspolozivo",
                "podsetnik",
                "verifikacija",
                "aktivacija",
                "balance",
                "reminder",
                "otp",
                "verification code",
                "activation",
            ]),
        }
    }

    /// Load tier lists from JSON. Empty tiers are rejected: a tier with no
    /// keywords silently disables a whole classification branch.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read classifier rules: {:?}", path.as_ref()))?;

        let rules: ClassifierRules =
            serde_json::from_str(&content).context("Failed to parse classifier rules JSON")?;

        if rules.expense.is_empty() || rules.income.is_empty() || rules.info.is_empty() {
            bail!("Classifier rules must have keywords in all three tiers");
        }

        Ok(rules)
    }

    /// Classify a lower-cased notification text.
    ///
    /// Pure function of its two inputs. Tier order is the conflict-resolution
    /// policy: a message mentioning both a card purchase and the remaining
    /// balance is an expense, not informational. Income with auto-track off
    /// is demoted to Info - the signal is recognized, the user opted out.
    pub fn classify(&self, normalized_text: &str, auto_track_income: bool) -> NotificationKind {
        if let Some(hit) = first_hit(&self.expense, normalized_text) {
            debug!(keyword = hit, "expense tier matched");
            return NotificationKind::Expense;
        }

        if let Some(hit) = first_hit(&self.income, normalized_text) {
            debug!(keyword = hit, auto_track_income, "income tier matched");
            return if auto_track_income {
                NotificationKind::Income
            } else {
                NotificationKind::Info
            };
        }

        if let Some(hit) = first_hit(&self.info, normalized_text) {
            debug!(keyword = hit, "info tier matched");
            return NotificationKind::Info;
        }

        NotificationKind::Unknown
    }
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn first_hit<'a>(keywords: &'a [String], text: &str) -> Option<&'a str> {
    keywords
        .iter()
        .find(|k| text.contains(k.as_str()))
        .map(|k| k.as_str())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// TESTS
// ============================================================================
