// 💰 Amount Extractor - Ordered pattern cascade over notification text
// First rule that matches AND parses to a positive value wins

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, trace};

use crate::currency::CurrencyTable;

/// Currency token adjacent to a numeral: a short alphabetic run in either
/// script (optionally dotted, "din."), or a lone currency glyph.
const CUR_TOKEN: &str = r"(?:\p{L}{1,12}\.?|[€$£])";

// ============================================================================
// EXTRACTED AMOUNT
// ============================================================================

/// Result of one successful extraction attempt. Transient - the pipeline
/// converts it into candidate fields immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAmount {
    /// Parsed value, always > 0
    pub value: f64,

    /// Canonical code of the resolved currency
    pub currency_code: String,
}

// ============================================================================
// RULE CASCADE
// ============================================================================

struct AmountRule {
    /// Short label for diagnostics
    name: &'static str,
    regex: Regex,
}

impl AmountRule {
    fn new(name: &'static str, pattern: String) -> Self {
        AmountRule {
            name,
            regex: Regex::new(&pattern).expect("invalid amount rule regex"),
        }
    }
}

/// Ordered cascade of numeral+currency patterns.
///
/// Rule order is the disambiguation policy across numeric-formatting
/// conventions and must stay fixed: European grouped numerals are claimed
/// before international ones, explicit currency adjacency before bare
/// numerals, labeled amounts last.
pub struct AmountExtractor {
    rules: Vec<AmountRule>,
}

impl AmountExtractor {
    pub fn new() -> Self {
        // Guards instead of lookarounds: a numeral must not continue a
        // longer digit run ("234,56" inside "1.234,56" never matches), and
        // a glyph-prefixed numeral is left for the symbol-prefixed rule.
        let pre = r"(?:^|[^\d.,€$£])";
        let post = r"(?:$|[^\d])";

        let rules = vec![
            // (a) thousands-dot / decimal-comma, currency token adjacent
            AmountRule::new(
                "dot-grouped-comma-decimal",
                format!(r"{pre}(?P<amt>\d{{1,3}}(?:\.\d{{3}})+(?:,\d{{1,2}})?)\s*(?P<cur>{CUR_TOKEN})"),
            ),
            // (b) decimal-comma without thousands grouping
            AmountRule::new(
                "comma-decimal",
                format!(r"{pre}(?P<amt>\d+,\d{{1,2}})(?:\s*(?P<cur>{CUR_TOKEN}))?{post}"),
            ),
            // (c) thousands-comma / decimal-dot (international), code adjacent
            AmountRule::new(
                "comma-grouped-dot-decimal",
                format!(r"{pre}(?P<amt>\d{{1,3}}(?:,\d{{3}})+(?:\.\d{{1,2}})?)\s*(?P<cur>{CUR_TOKEN})"),
            ),
            // (d) plain decimal-dot numeral
            AmountRule::new(
                "dot-decimal",
                format!(r"{pre}(?P<amt>\d+\.\d{{1,2}})(?:\s*(?P<cur>{CUR_TOKEN}))?{post}"),
            ),
            // (e) grouped integer, either separator style, token adjacent
            AmountRule::new(
                "grouped-integer",
                format!(r"{pre}(?P<amt>\d{{1,3}}(?:[.,]\d{{3}})+)\s*(?P<cur>{CUR_TOKEN})"),
            ),
            // (f) symbol-prefixed numeral ("€ 99,90", "$1,234.56")
            AmountRule::new(
                "symbol-prefixed",
                format!(r"(?P<cur>[€$£])\s*(?P<amt>\d+(?:[.,]\d{{1,3}})*)"),
            ),
            // (g) symbol-suffixed numeral ("99,90€")
            AmountRule::new(
                "symbol-suffixed",
                format!(r"{pre}(?P<amt>\d+(?:[.,]\d{{1,3}})*)\s*(?P<cur>[€$£])"),
            ),
            // (h) label-prefixed numeral, either decimal convention
            AmountRule::new(
                "label-prefixed",
                format!(
                    r"(?i){pre}(?:iznos|amount|suma)\s*[:=]?\s*(?P<amt>\d+(?:[.,]\d{{1,3}})*)(?:\s*(?P<cur>{CUR_TOKEN}))?"
                ),
            ),
        ];

        AmountExtractor { rules }
    }

    /// Run the cascade over raw (non-lower-cased) notification text.
    ///
    /// A rule whose numeral fails to parse, or parses to a non-positive
    /// value, is treated as non-matching and the cascade continues. No
    /// rule left means extraction failed - a normal terminal state, not
    /// an error.
    pub fn extract(&self, text: &str, currencies: &CurrencyTable) -> Option<ExtractedAmount> {
        for rule in &self.rules {
            let Some(caps) = rule.regex.captures(text) else {
                continue;
            };

            let raw = &caps["amt"];
            let Some(value) = parse_localized(raw) else {
                trace!(rule = rule.name, raw, "numeral did not parse");
                continue;
            };
            if value <= 0.0 {
                trace!(rule = rule.name, raw, value, "non-positive, rule skipped");
                continue;
            }

            let token = caps.name("cur").map(|m| m.as_str()).unwrap_or("");
            let currency = currencies.resolve_alias(token);
            debug!(rule = rule.name, raw, value, currency = %currency.code, "amount extracted");

            return Some(ExtractedAmount {
                value,
                currency_code: currency.code.clone(),
            });
        }

        debug!("no amount rule matched");
        None
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// LOCALE-AWARE NUMERAL PARSING
// ============================================================================

fn dot_grouped() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,3}(?:\.\d{3})+$").expect("invalid regex"))
}

/// Parse a numeral that may use either separator convention.
///
/// Disambiguation: when both separators appear, the rightmost one is the
/// decimal point and the other groups thousands. A lone comma is a decimal
/// point. Dots with no comma are thousands grouping when the digits form
/// exact triples, otherwise a decimal point.
pub fn parse_localized(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let cleaned = match (s.rfind('.'), s.rfind(',')) {
        (Some(dot), Some(comma)) => {
            if comma > dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(_)) => s.replace(',', "."),
        (Some(_), None) => {
            if dot_grouped().is_match(s) {
                s.replace('.', "")
            } else {
                s.to_string()
            }
        }
        (None, None) => s.to_string(),
    };

    cleaned.parse::<f64>().ok()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<ExtractedAmount> {
        AmountExtractor::new().extract(text, &CurrencyTable::with_defaults())
    }

    #[test]
    fn test_parse_both_separators_comma_decimal() {
        assert_eq!(parse_localized("1.234,56"), Some(1234.56));
        assert_eq!(parse_localized("12.345.678,90"), Some(12345678.90));
    }

    #[test]
    fn test_parse_both_separators_dot_decimal() {
        assert_eq!(parse_localized("1,234.56"), Some(1234.56));
    }

    #[test]
    fn test_parse_lone_comma_is_decimal() {
        assert_eq!(parse_localized("300,00"), Some(300.0));
        assert_eq!(parse_localized("12,5"), Some(12.5));
    }

    #[test]
    fn test_parse_dot_grouped_integer() {
        assert_eq!(parse_localized("50.000"), Some(50000.0));
        assert_eq!(parse_localized("1.234"), Some(1234.0));
    }

    #[test]
    fn test_parse_plain_dot_decimal() {
        assert_eq!(parse_localized("12.5"), Some(12.5));
        assert_eq!(parse_localized("1234.56"), Some(1234.56));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert_eq!(parse_localized(""), None);
        assert_eq!(parse_localized("1,2,3"), None);
    }

    #[test]
    fn test_extract_serbian_grouped_with_code() {
        let amount = extract("Purchase at MAXI 1.234,56 RSD").unwrap();
        assert_eq!(amount.value, 1234.56);
        assert_eq!(amount.currency_code, "RSD");
    }

    #[test]
    fn test_extract_international_with_code() {
        let amount = extract("Card payment 1,234.56 EUR").unwrap();
        assert_eq!(amount.value, 1234.56);
        assert_eq!(amount.currency_code, "EUR");
    }

    #[test]
    fn test_extract_comma_decimal_bare() {
        let amount = extract("Uplata 1500,50").unwrap();
        assert_eq!(amount.value, 1500.5);
        assert_eq!(amount.currency_code, "RSD");
    }

    #[test]
    fn test_extract_cyrillic_suffix() {
        let amount = extract("Plaćanje 2.500,00 дин. kod IDEA").unwrap();
        assert_eq!(amount.value, 2500.0);
        assert_eq!(amount.currency_code, "RSD");
    }

    #[test]
    fn test_extract_symbol_prefixed() {
        let amount = extract("Charged $45.99 today").unwrap();
        assert_eq!(amount.value, 45.99);
        assert_eq!(amount.currency_code, "USD");
    }

    #[test]
    fn test_extract_symbol_suffixed() {
        let amount = extract("Racun 99,90€").unwrap();
        assert_eq!(amount.value, 99.90);
        assert_eq!(amount.currency_code, "EUR");
    }

    #[test]
    fn test_extract_label_prefixed() {
        let amount = extract("Iznos: 1.234,56").unwrap();
        assert_eq!(amount.value, 1234.56);
        assert_eq!(amount.currency_code, "RSD");
    }

    #[test]
    fn test_extract_grouped_integer_with_token() {
        let amount = extract("Stanje 12.345 RSD").unwrap();
        assert_eq!(amount.value, 12345.0);
        assert_eq!(amount.currency_code, "RSD");
    }

    #[test]
    fn test_zero_is_failure_not_match() {
        assert!(extract("Iznos: 0,00").is_none());
        assert!(extract("Amount 0.00 RSD za proveru").is_none());
    }

    #[test]
    fn test_no_numeral_fails() {
        assert!(extract("Vasa kartica je aktivirana").is_none());
    }

    #[test]
    fn test_unrecognized_token_resolves_to_base() {
        let amount = extract("Potroseno 1.250,00 QQQ").unwrap();
        assert_eq!(amount.currency_code, "RSD");
        assert_eq!(amount.value, 1250.0);
    }

    #[test]
    fn test_numeral_inside_longer_run_not_split() {
        // "234,56" must not be carved out of "1.234,56"
        let amount = extract("Total 1.234,56 EUR").unwrap();
        assert_eq!(amount.value, 1234.56);
        assert_eq!(amount.currency_code, "EUR");
    }
}
