//! Cross-check between a statement's own printed totals and the sums
//! computed from parsed line items. A mismatch is never a crash: it is
//! surfaced as a report with enough context (section, sample rows, unparsed
//! lines) for a human to reconcile by hand, and escalated to an error only
//! when the caller has not asked for an override.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{StatementParseError, StatementResult};
use crate::parsers::checking::types::CheckingStatement;
use crate::parsers::credit_card::types::CreditCardStatement;
use crate::types::{Section, Transaction};

/// How many parsed rows a mismatch carries for manual inspection.
pub const MISMATCH_SAMPLE_ROWS: usize = 5;

/// One disagreement between a printed and a computed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionMismatch {
    /// `None` for the credit-card statement-level balance check.
    pub section: Option<Section>,
    pub printed: Decimal,
    pub computed: Decimal,
    /// Bounded sample of the section's parsed transactions.
    pub sample: Vec<Transaction>,
    /// Every line the parser could not attribute in this section.
    pub unparsed: Vec<String>,
}

impl SectionMismatch {
    pub fn difference(&self) -> Decimal {
        (self.computed - self.printed).abs()
    }
}

impl fmt::Display for SectionMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.section {
            Some(section) => write!(f, "section {section}: ")?,
            None => write!(f, "statement balance: ")?,
        }
        writeln!(
            f,
            "printed {} vs computed {} (difference {})",
            self.printed,
            self.computed,
            self.difference()
        )?;
        for txn in &self.sample {
            writeln!(f, "  row: {} {} {}", txn.date, txn.amount, txn.description)?;
        }
        for raw in &self.unparsed {
            writeln!(f, "  unparsed: {raw}")?;
        }
        Ok(())
    }
}

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub mismatches: Vec<SectionMismatch>,
    /// Balance labels that never appeared (credit card only).
    pub missing_balances: Vec<String>,
}

impl ReconcileReport {
    pub fn is_balanced(&self) -> bool {
        self.mismatches.is_empty() && self.missing_balances.is_empty()
    }

    /// Escalate to a hard failure unless the caller accepts mismatches.
    pub fn into_result(self, accept_mismatch: bool) -> StatementResult<()> {
        if self.is_balanced() || accept_mismatch {
            Ok(())
        } else {
            Err(StatementParseError::ReconciliationMismatch(self))
        }
    }
}

impl fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_balanced() {
            return write!(f, "balanced");
        }
        for label in &self.missing_balances {
            writeln!(f, "missing balance label: {label}")?;
        }
        for mismatch in &self.mismatches {
            write!(f, "{mismatch}")?;
        }
        Ok(())
    }
}

/// Compares parser-produced sums against statement-declared totals within a
/// fixed absolute tolerance of one cent.
#[derive(Debug, Clone)]
pub struct Reconciler {
    tolerance: Decimal,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(1, 2),
        }
    }
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Per section with a printed `TOTAL`, compare it to the sum of absolute
    /// transaction amounts rounded to the cent.
    pub fn check_checking(&self, statement: &CheckingStatement) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for (section, total) in &statement.section_totals {
            let computed = statement
                .section_transactions(*section)
                .map(|t| t.amount.abs())
                .sum::<Decimal>()
                .round_dp(2);

            if (computed - total.printed_amount).abs() > self.tolerance {
                report.mismatches.push(SectionMismatch {
                    section: Some(*section),
                    printed: total.printed_amount,
                    computed,
                    sample: statement
                        .section_transactions(*section)
                        .take(MISMATCH_SAMPLE_ROWS)
                        .cloned()
                        .collect(),
                    unparsed: statement
                        .unparsed_for(*section)
                        .iter()
                        .map(|u| u.raw_text.clone())
                        .collect(),
                });
            }
        }

        report
    }

    /// Compare `previous_balance + Σ(signed amounts)` to `new_balance`.
    /// Transactions carry signed amounts, so payments and credits net out.
    pub fn check_credit_card(&self, statement: &CreditCardStatement) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if statement.previous_balance.is_none() {
            report.missing_balances.push("previous balance".to_string());
        }
        if statement.new_balance.is_none() {
            report.missing_balances.push("new balance".to_string());
        }

        if let (Some(previous), Some(new)) = (statement.previous_balance, statement.new_balance) {
            let computed = (previous
                + statement
                    .transactions
                    .iter()
                    .map(|t| t.amount)
                    .sum::<Decimal>())
            .round_dp(2);

            if (computed - new).abs() > self.tolerance {
                report.mismatches.push(SectionMismatch {
                    section: None,
                    printed: new,
                    computed,
                    sample: statement
                        .transactions
                        .iter()
                        .take(MISMATCH_SAMPLE_ROWS)
                        .cloned()
                        .collect(),
                    unparsed: Vec::new(),
                });
            }
        }

        report
    }
}
