// 💱 Currency Table - Canonical currencies, aliases, static rates
// Rates are configuration, not live data: refresh by loading a new table

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Currency every stored amount is normalized to.
pub const BASE_CURRENCY: &str = "RSD";

// ============================================================================
// CURRENCY
// ============================================================================

/// One canonical currency with the textual forms notifications use for it.
///
/// Identity: `code` (ISO 4217). Aliases carry codes, symbols and localized
/// spellings in both scripts; matching is case-insensitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    /// Canonical code, e.g. "RSD"
    pub code: String,

    /// Recognized textual forms: codes, symbols, localized spellings
    /// Example: ["RSD", "din", "дин", "динара"]
    pub aliases: Vec<String>,

    /// Static conversion rate: 1 unit of this currency = `rate_to_base`
    /// units of the base currency. Exactly 1.0 for the base itself.
    pub rate_to_base: f64,
}

impl Currency {
    pub fn new(code: &str, aliases: &[&str], rate_to_base: f64) -> Self {
        Currency {
            code: code.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            rate_to_base,
        }
    }

    /// Case-insensitive alias check. A trailing dot on the token is
    /// tolerated ("din." vs "din").
    pub fn recognizes(&self, token: &str) -> bool {
        let token = token.trim().trim_end_matches('.').to_lowercase();
        if token.is_empty() {
            return false;
        }
        self.aliases
            .iter()
            .any(|a| a.trim_end_matches('.').to_lowercase() == token)
    }
}

// ============================================================================
// CURRENCY TABLE
// ============================================================================

/// Registry of all currencies the pipeline can resolve.
///
/// Immutable reference data. `resolve_alias` never fails: unrecognized
/// tokens fall back to the base currency so extraction stays total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyTable {
    /// Canonical code of the base currency
    pub base: String,

    /// All known currencies, base included
    pub currencies: Vec<Currency>,
}

impl CurrencyTable {
    /// Table with the currencies Serbian banking notifications actually
    /// mention. Rates are static snapshots; callers refresh via
    /// `from_file` without code changes.
    pub fn with_defaults() -> Self {
        CurrencyTable {
            base: BASE_CURRENCY.to_string(),
            currencies: vec![
                Currency::new(
                    "RSD",
                    &["RSD", "din", "din.", "дин", "дин.", "динара", "dinara"],
                    1.0,
                ),
                Currency::new("EUR", &["EUR", "€", "eur", "evra", "евра", "евро"], 117.2),
                Currency::new("USD", &["USD", "$", "usd", "dolara", "долара"], 108.4),
                Currency::new("CHF", &["CHF", "chf", "franaka", "франака"], 121.9),
                Currency::new("GBP", &["GBP", "£", "gbp", "funti", "фунти"], 136.8),
            ],
        }
    }

    /// Load a table from JSON, validating its invariants.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read currency table: {:?}", path.as_ref()))?;

        let table: CurrencyTable =
            serde_json::from_str(&content).context("Failed to parse currency table JSON")?;

        table.validate()?;
        Ok(table)
    }

    /// Invariants: base currency exists with rate exactly 1.0; every
    /// currency lists its own code among its aliases.
    pub fn validate(&self) -> Result<()> {
        let base = self
            .currencies
            .iter()
            .find(|c| c.code == self.base)
            .with_context(|| format!("Base currency {} missing from table", self.base))?;

        if base.rate_to_base != 1.0 {
            bail!("Base currency {} must have rate 1.0", self.base);
        }

        for currency in &self.currencies {
            if !currency.recognizes(&currency.code) {
                bail!("Currency {} does not alias its own code", currency.code);
            }
            if currency.rate_to_base <= 0.0 {
                bail!("Currency {} has non-positive rate", currency.code);
            }
        }

        Ok(())
    }

    pub fn base_currency(&self) -> &Currency {
        // validate() guarantees presence; with_defaults always includes it
        self.currencies
            .iter()
            .find(|c| c.code == self.base)
            .unwrap_or(&self.currencies[0])
    }

    /// Resolve a textual token to a currency. Never fails: tokens nothing
    /// recognizes resolve to the base currency.
    pub fn resolve_alias(&self, token: &str) -> &Currency {
        self.currencies
            .iter()
            .find(|c| c.recognizes(token))
            .unwrap_or_else(|| self.base_currency())
    }

    fn rate_of(&self, code: &str) -> f64 {
        self.currencies
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.rate_to_base)
            .unwrap_or(1.0)
    }

    /// Convert an amount denominated in `code` into the base currency.
    pub fn to_base(&self, amount: f64, code: &str) -> f64 {
        amount * self.rate_of(code)
    }

    /// Convert a base-currency amount into `code`.
    pub fn from_base(&self, amount: f64, code: &str) -> f64 {
        amount / self.rate_of(code)
    }

    /// Convert between two arbitrary currencies through the base.
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        self.from_base(self.to_base(amount, from), to)
    }
}

impl Default for CurrencyTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let table = CurrencyTable::with_defaults();
        assert!(table.validate().is_ok());
        assert_eq!(table.base, "RSD");
    }

    #[test]
    fn test_resolve_code_and_symbol() {
        let table = CurrencyTable::with_defaults();
        assert_eq!(table.resolve_alias("EUR").code, "EUR");
        assert_eq!(table.resolve_alias("€").code, "EUR");
        assert_eq!(table.resolve_alias("$").code, "USD");
    }

    #[test]
    fn test_resolve_cyrillic_alias() {
        let table = CurrencyTable::with_defaults();
        assert_eq!(table.resolve_alias("дин").code, "RSD");
        assert_eq!(table.resolve_alias("дин.").code, "RSD");
        assert_eq!(table.resolve_alias("евра").code, "EUR");
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let table = CurrencyTable::with_defaults();
        assert_eq!(table.resolve_alias("rsd").code, "RSD");
        assert_eq!(table.resolve_alias("Eur").code, "EUR");
    }

    #[test]
    fn test_unrecognized_token_defaults_to_base() {
        let table = CurrencyTable::with_defaults();
        assert_eq!(table.resolve_alias("XYZ").code, "RSD");
        assert_eq!(table.resolve_alias("").code, "RSD");
    }

    #[test]
    fn test_to_base_conversion() {
        let table = CurrencyTable::with_defaults();
        let rsd = table.to_base(10.0, "EUR");
        assert!((rsd - 1172.0).abs() < 1e-9);
        // Base is identity
        assert_eq!(table.to_base(500.0, "RSD"), 500.0);
    }

    #[test]
    fn test_convert_through_base() {
        let table = CurrencyTable::with_defaults();
        let usd = table.convert(100.0, "EUR", "USD");
        assert!((usd - 100.0 * 117.2 / 108.4).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_missing_base() {
        let table = CurrencyTable {
            base: "RSD".to_string(),
            currencies: vec![Currency::new("EUR", &["EUR"], 117.2)],
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_base_rate() {
        let table = CurrencyTable {
            base: "RSD".to_string(),
            currencies: vec![Currency::new("RSD", &["RSD"], 2.0)],
        };
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_currency_without_own_code_alias() {
        let table = CurrencyTable {
            base: "RSD".to_string(),
            currencies: vec![
                Currency::new("RSD", &["RSD"], 1.0),
                Currency::new("EUR", &["€"], 117.2),
            ],
        };
        assert!(table.validate().is_err());
    }
}
