use std::collections::BTreeMap;

use crate::types::{Section, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A statement's own printed subtotal, captured from a `TOTAL` marker line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTotal {
    pub section: Section,
    /// Printed totals are unsigned on the statement; stored non-negative.
    pub printed_amount: Decimal,
}

/// A line inside an active section that could not be attributed to an open
/// or newly opened transaction. Retained so reconciliation diagnostics can
/// surface it; never silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnparsedLine {
    pub section: Section,
    pub raw_text: String,
}

/// Everything one pass over a checking/deposit statement produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckingStatement {
    pub transactions: Vec<Transaction>,
    /// At most one printed total per section; absent when the statement
    /// carries no `TOTAL` line for it.
    pub section_totals: BTreeMap<Section, SectionTotal>,
    pub unparsed: BTreeMap<Section, Vec<UnparsedLine>>,
}

impl CheckingStatement {
    /// Transactions belonging to one section, in statement order.
    pub fn section_transactions(&self, section: Section) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.section == Some(section))
    }

    pub fn unparsed_for(&self, section: Section) -> &[UnparsedLine] {
        self.unparsed.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn txn(section: Section, amount: &str) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 7, 15).unwrap(),
            amount: Decimal::from_str(amount).unwrap(),
            section: Some(section),
            description: "TEST".to_string(),
        }
    }

    #[test]
    fn test_section_transactions_filters_by_section() {
        let statement = CheckingStatement {
            transactions: vec![
                txn(Section::Deposit, "100.00"),
                txn(Section::Withdrawal, "40.00"),
                txn(Section::Deposit, "60.00"),
            ],
            ..Default::default()
        };

        let deposits: Vec<_> = statement.section_transactions(Section::Deposit).collect();
        assert_eq!(deposits.len(), 2);
        assert!(statement.section_transactions(Section::Fee).next().is_none());
    }

    #[test]
    fn test_unparsed_for_missing_section_is_empty() {
        let statement = CheckingStatement::default();
        assert!(statement.unparsed_for(Section::Deposit).is_empty());
    }

    #[test]
    fn test_statement_serialization() {
        let mut statement = CheckingStatement {
            transactions: vec![txn(Section::Deposit, "100.00")],
            ..Default::default()
        };
        statement.section_totals.insert(
            Section::Deposit,
            SectionTotal {
                section: Section::Deposit,
                printed_amount: Decimal::from_str("100.00").unwrap(),
            },
        );
        statement.unparsed.entry(Section::Deposit).or_default().push(UnparsedLine {
            section: Section::Deposit,
            raw_text: "REFERENCE 0042".to_string(),
        });

        let json = serde_json::to_string(&statement).unwrap();
        let deserialized: CheckingStatement = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, statement);
    }
}
