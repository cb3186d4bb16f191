use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Checking-statement category under which transactions and printed totals
/// are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Deposit,
    Withdrawal,
    Fee,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Section::Deposit => "deposit",
            Section::Withdrawal => "withdrawal",
            Section::Fee => "fee",
        };
        f.write_str(label)
    }
}

/// Normalized output of both statement pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Sign as printed on the statement: parenthesized or minus-prefixed
    /// tokens are negative. Always carries exactly two fractional digits.
    pub amount: Decimal,
    /// `None` for credit-card transactions, which have no section grouping.
    pub section: Option<Section>,
    pub description: String,
}

impl Transaction {
    /// Build a transaction from the ordered raw lines of a statement record.
    /// Lines are joined in order and flattened to single-line text.
    pub fn from_lines(
        date: NaiveDate,
        amount: Decimal,
        section: Option<Section>,
        lines: Vec<String>,
    ) -> Self {
        Self {
            date,
            amount,
            section,
            description: flatten_lines(&lines),
        }
    }
}

/// Join raw record lines with normalized single-space whitespace.
pub(crate) fn flatten_lines(lines: &[String]) -> String {
    let joined = lines.join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
