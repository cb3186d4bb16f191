//! Register rows for the downstream bookkeeping writer: transactions
//! reordered by statement section, amounts made absolute, descriptions
//! already flattened, and a category label assigned from keyword rules.

use std::io::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::StatementResult;
use crate::types::{Section, Transaction};

/// Register rows follow the statement's section order.
pub const SECTION_ORDER: [Section; 3] = [Section::Deposit, Section::Withdrawal, Section::Fee];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRow {
    pub date: NaiveDate,
    pub description: String,
    /// Register amounts are unsigned; the section carries the direction.
    pub amount: Decimal,
    pub category: String,
}

/// Labels a transaction when every keyword appears in its lowercased
/// description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub keywords: Vec<String>,
    pub label: String,
}

impl CategoryRule {
    pub fn new(keywords: &[&str], label: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            label: label.to_string(),
        }
    }

    fn matches(&self, description: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let lower = description.to_lowercase();
        self.keywords.iter().all(|k| lower.contains(k))
    }
}

/// Builds register rows from parsed transactions. Deposit-side and
/// payment-side rules are kept separate; unmatched rows fall back to
/// `Income` or `Payment` by section.
#[derive(Debug, Clone, Default)]
pub struct Register {
    deposit_rules: Vec<CategoryRule>,
    payment_rules: Vec<CategoryRule>,
}

impl Register {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit_rule(mut self, rule: CategoryRule) -> Self {
        self.deposit_rules.push(rule);
        self
    }

    pub fn payment_rule(mut self, rule: CategoryRule) -> Self {
        self.payment_rules.push(rule);
        self
    }

    /// Rows ordered deposit → withdrawal → fee, then sectionless
    /// (credit-card) transactions; input order is preserved within a group.
    pub fn rows(&self, transactions: &[Transaction]) -> Vec<RegisterRow> {
        let mut rows = Vec::with_capacity(transactions.len());
        for section in SECTION_ORDER {
            for transaction in transactions.iter().filter(|t| t.section == Some(section)) {
                rows.push(self.row(transaction));
            }
        }
        for transaction in transactions.iter().filter(|t| t.section.is_none()) {
            rows.push(self.row(transaction));
        }
        rows
    }

    fn row(&self, transaction: &Transaction) -> RegisterRow {
        RegisterRow {
            date: transaction.date,
            description: transaction.description.clone(),
            amount: transaction.amount.abs(),
            category: self.category(transaction),
        }
    }

    fn category(&self, transaction: &Transaction) -> String {
        let (rules, fallback) = match transaction.section {
            Some(Section::Deposit) => (&self.deposit_rules, "Income"),
            _ => (&self.payment_rules, "Payment"),
        };
        rules
            .iter()
            .find(|rule| rule.matches(&transaction.description))
            .map(|rule| rule.label.clone())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Write rows as `Date,Description,Amount,Category` CSV with
    /// `MM/DD/YYYY` dates.
    pub fn write_csv<W: Write>(&self, writer: W, transactions: &[Transaction]) -> StatementResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["Date", "Description", "Amount", "Category"])?;
        for row in self.rows(transactions) {
            csv_writer.write_record([
                row.date.format("%m/%d/%Y").to_string(),
                row.description,
                row.amount.to_string(),
                row.category,
            ])?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
