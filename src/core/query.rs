use std::cmp::Ordering;
use std::str::FromStr;

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::debug;

use super::Transaction;

/// Compiles a user supplied pattern.
///
/// Returns `None` for an empty pattern or invalid syntax, in which case
/// callers show the list unfiltered.
pub fn compile(pattern: &str, case_insensitive: bool) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    match RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            debug!(pattern, error = %e, "Invalid search pattern");
            None
        }
    }
}

/// Markers wrapped around every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlighter {
    pub open: String,
    pub close: String,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(r#"<mark class="search-highlight">"#, "</mark>")
    }
}

impl Highlighter {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Wraps every match of `re` in `text`.
    pub fn highlight(&self, text: &str, re: &Regex) -> String {
        re.replace_all(text, |caps: &regex::Captures| {
            format!("{}{}{}", self.open, &caps[0], self.close)
        })
        .into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub highlighted_description: String,
    pub original_description: String,
    /// False when the pattern was applied and nothing matched.
    pub is_match: bool,
}

impl SearchHit {
    /// A hit for an unfiltered listing.
    pub fn plain(transaction: &Transaction) -> Self {
        Self {
            highlighted_description: transaction.description.clone(),
            original_description: transaction.description.clone(),
            transaction: transaction.clone(),
            is_match: true,
        }
    }
}

pub fn search(transactions: &[Transaction], pattern: &str) -> Vec<SearchHit> {
    search_with(transactions, pattern, &Highlighter::default())
}

/// Annotates every transaction with its highlighted description.
///
/// A blank or invalid pattern leaves every description untouched.
pub fn search_with(
    transactions: &[Transaction],
    pattern: &str,
    highlighter: &Highlighter,
) -> Vec<SearchHit> {
    let re = if pattern.trim().is_empty() {
        None
    } else {
        compile(pattern, true)
    };
    let Some(re) = re else {
        return transactions.iter().map(SearchHit::plain).collect();
    };
    debug!(pattern, count = transactions.len(), "Searching transactions");
    transactions
        .iter()
        .map(|t| SearchHit {
            highlighted_description: highlighter.highlight(&t.description, &re),
            original_description: t.description.clone(),
            is_match: re.is_match(&t.description),
            transaction: t.clone(),
        })
        .collect()
}

/// Ready-made patterns for common finance searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Food and drink keywords.
    Food,
    /// Descriptions mentioning a figure with cents.
    Decimals,
    /// Figures of 50000 and up.
    Large,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Food, Preset::Decimals, Preset::Large];

    pub fn pattern(self) -> &'static str {
        match self {
            Preset::Food => r"(latte|coffee|tea|dinner|lunch|breakfast|snack)",
            Preset::Decimals => r"\.\d{2}\b",
            Preset::Large => r"\b(5\d{4,}|\d{6,})\b",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Food => "food",
            Preset::Decimals => "decimals",
            Preset::Large => "large",
        }
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Description,
    Category,
    Amount,
    Date,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(SortKey::Description),
            "category" => Ok(SortKey::Category),
            "amount" => Ok(SortKey::Amount),
            "date" => Ok(SortKey::Date),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

impl SortKey {
    fn compare(self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            SortKey::Description => text_order(&a.description, &b.description),
            SortKey::Category => text_order(&a.category, &b.category),
            SortKey::Amount => a.amount.total_cmp(&b.amount),
            SortKey::Date => date_order(&a.date, &b.date),
        }
    }

    /// Stable, non-mutating sort.
    pub fn sort(self, transactions: &[Transaction]) -> Vec<Transaction> {
        let mut out = transactions.to_vec();
        out.sort_by(|a, b| self.compare(a, b));
        out
    }
}

/// Sorts by a key name; an unknown key keeps the current order.
pub fn sort_by(transactions: &[Transaction], key: &str) -> Vec<Transaction> {
    match key.parse::<SortKey>() {
        Ok(key) => key.sort(transactions),
        Err(_) => transactions.to_vec(),
    }
}

fn text_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// unparseable dates sort after every real date
fn date_order(a: &str, b: &str) -> Ordering {
    let parse = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
