// 🏪 Merchant Extractor - Ordered span-matching cascade
// Preposition-led, then label-led, then the span trailing a currency token

use regex::Regex;
use tracing::debug;

use crate::currency::CurrencyTable;

/// Spans shorter than this are noise, not merchant names.
pub const MIN_MERCHANT_LEN: usize = 2;

/// Accepted labels are cut to this many characters.
pub const MAX_MERCHANT_LEN: usize = 50;

// ============================================================================
// EXTRACTOR
// ============================================================================

struct MerchantRule {
    name: &'static str,
    regex: Regex,
}

/// Pulls a short merchant label out of raw notification text.
///
/// Three rules, evaluated in priority order, first acceptable span wins.
/// No rule matching is a normal outcome (None), category inference then
/// proceeds on the text alone.
pub struct MerchantExtractor {
    rules: Vec<MerchantRule>,
}

impl MerchantExtractor {
    /// Build the cascade. The currency-trailing rule derives its token
    /// alternation from the table's aliases, so a refreshed table also
    /// refreshes merchant extraction.
    pub fn new(currencies: &CurrencyTable) -> Self {
        // A merchant span runs until punctuation, a digit, or end of text.
        // First character must be a word-ish one so a bare separator can
        // never become the whole span.
        let span = r"(?P<m>[^\s\d.,;:!?\n][^\d.,;:!?\n]*)";

        let preposition = format!(r"(?i)(?:\b(?:at|near|kod)\b|@)\s*{span}");
        let label = format!(r"(?i)(?:merchant|vendor|prodajno mesto|trgovac)\s*:\s*{span}");

        // Longest alias first so "din." wins over "din"
        let mut aliases: Vec<String> = currencies
            .currencies
            .iter()
            .flat_map(|c| c.aliases.iter())
            .map(|a| regex::escape(a))
            .collect();
        aliases.sort_by(|a, b| b.len().cmp(&a.len()));
        let trailing = format!(r"(?i)\b(?:{})\s+{span}", aliases.join("|"));

        let rules = vec![
            MerchantRule {
                name: "preposition-led",
                regex: Regex::new(&preposition).expect("invalid merchant rule regex"),
            },
            MerchantRule {
                name: "label-led",
                regex: Regex::new(&label).expect("invalid merchant rule regex"),
            },
            MerchantRule {
                name: "currency-trailing",
                regex: Regex::new(&trailing).expect("invalid merchant rule regex"),
            },
        ];

        MerchantExtractor { rules }
    }

    /// Try each rule in order over raw (non-lower-cased) text.
    pub fn extract(&self, text: &str) -> Option<String> {
        for rule in &self.rules {
            let Some(caps) = rule.regex.captures(text) else {
                continue;
            };

            let span = caps["m"].trim();
            if span.chars().count() < MIN_MERCHANT_LEN {
                continue;
            }

            let label: String = span.chars().take(MAX_MERCHANT_LEN).collect();
            let label = label.trim_end().to_string();
            debug!(rule = rule.name, merchant = %label, "merchant extracted");
            return Some(label);
        }

        None
    }
}

// ============================================================================
// TESTS
// ============================================================================
