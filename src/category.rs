// 🗂️ Category Inference - Ordered keyword groups, first hit wins
// Group order is the disambiguation policy for ambiguous terms

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// GROUP TABLE
// ============================================================================

/// One category group: the tag it assigns and the keywords that claim it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// Category tag written onto the candidate (e.g. "groceries")
    pub category: String,

    /// Lower-cased keywords; any one present in the text claims the group
    pub keywords: Vec<String>,
}

impl CategoryGroup {
    fn new(category: &str, keywords: &[&str]) -> Self {
        CategoryGroup {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Ordered table of category groups plus the catch-all default.
///
/// Evaluated top to bottom; some keywords could plausibly sit in more than
/// one group, so the fixed order IS the policy and must not be re-sorted.
/// Rules as data: `with_defaults()` ships the built-in table, `from_file`
/// loads per-locale or per-institution replacements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryTable {
    pub groups: Vec<CategoryGroup>,

    /// Assigned when no group matches
    pub default_category: String,
}

impl CategoryTable {
    /// Built-in groups for Serbian banking text: domestic chain names plus
    /// the generic English vocabulary notifications mix in.
    pub fn with_defaults() -> Self {
        CategoryTable {
            groups: vec![
                CategoryGroup::new(
                    "groceries",
                    &[
                        "maxi", "idea", "lidl", "roda", "tempo", "univerexport", "aman",
                        "market", "supermarket", "restoran", "restaurant", "kafic", "kafić",
                        "cafe", "caffe", "pekara", "grocery", "mcdonald", "kfc", "glovo",
                        "wolt", "donesi",
                    ],
                ),
                CategoryGroup::new(
                    "transport",
                    &[
                        "nis petrol", "omv", "mol ", "lukoil", "gazprom", "benzin", "gorivo",
                        "fuel", "petrol", "taxi", "taksi", "gsp", "bus plus", "parking",
                    ],
                ),
                CategoryGroup::new(
                    "shopping",
                    &[
                        "zara", "h&m", "reserved", "dexy", "tehnomanija", "gigatron",
                        "emmezeta", "ikea", "amazon", "aliexpress", "shop", "store",
                        "prodavnica", "butik",
                    ],
                ),
                CategoryGroup::new(
                    "health",
                    &[
                        "apoteka", "pharmacy", "benu", "dm ", "lilly", "bolnica", "hospital",
                        "doktor", "clinic", "klinika", "ordinacija", "stomatolog",
                    ],
                ),
                CategoryGroup::new(
                    "entertainment",
                    &[
                        "netflix", "spotify", "hbo", "disney", "youtube", "steam",
                        "playstation", "bioskop", "cinema", "cineplexx", "pozoriste",
                        "subscription", "pretplata",
                    ],
                ),
                CategoryGroup::new(
                    "utilities",
                    &[
                        "eps", "struja", "infostan", "telekom", "mts", "yettel", "a1 ",
                        "sbb", "komunalije", "internet", "utility", "racun za",
                    ],
                ),
                CategoryGroup::new(
                    "cash",
                    &[
                        "bankomat", "atm", "gotovina", "gotovine", "cash withdrawal",
                        "podizanje novca",
                    ],
                ),
            ],
            default_category: "other".to_string(),
        }
    }

    /// Load a replacement table from JSON, keeping the ordering as written.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read category table: {:?}", path.as_ref()))?;

        let table: CategoryTable =
            serde_json::from_str(&content).context("Failed to parse category table JSON")?;

        if table.default_category.is_empty() {
            bail!("Category table needs a default category");
        }
        for group in &table.groups {
            if group.keywords.is_empty() {
                bail!("Category group {} has no keywords", group.category);
            }
        }

        Ok(table)
    }

    /// First group with any keyword present in the (lower-cased) text wins.
    pub fn infer(&self, normalized_text: &str) -> &str {
        for group in &self.groups {
            if group
                .keywords
                .iter()
                .any(|k| normalized_text.contains(k.as_str()))
            {
                return &group.category;
            }
        }
        &self.default_category
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// TESTS
// ============================================================================
