//! Credit-card statement parser (PDF-extracted text).
//!
//! Expected shape: a balance region at the top (previous/new balance
//! labels), then a transaction region where every date-bearing line starts a
//! new block and wrapped description text follows:
//!   Previous Balance $120.00
//!   New Balance $165.30
//!   01/05 COFFEE SHOP PORTLAND OR
//!   CARD ENDING 9921 12.30

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use super::types::CreditCardStatement;
use crate::errors::StatementResult;
use crate::parsers::tokens::{AMOUNT_PATTERN, AmountToken, DATE_PATTERN, DateToken};
use crate::parsers::traits::StatementParser;
use crate::types::Transaction;

/// Lines grouped under one date-bearing line, waiting to be flushed.
#[derive(Debug, Clone)]
struct Block {
    date: NaiveDate,
    lines: Vec<String>,
}

pub struct CreditCardParser {
    default_year: i32,
    date_anywhere: Regex,
    amount_anywhere: Regex,
    new_balance: Regex,
    previous_balance: Regex,
    summary_guard: Regex,
}

impl CreditCardParser {
    pub fn new(default_year: i32) -> StatementResult<Self> {
        Ok(Self {
            default_year,
            date_anywhere: Regex::new(DATE_PATTERN)?,
            amount_anywhere: Regex::new(AMOUNT_PATTERN)?,
            new_balance: Regex::new(r"(?i)NEW\s+BALANCE")?,
            previous_balance: Regex::new(r"(?i)(?:PREVIOUS|PRIOR|BEGINNING)\s+BALANCE")?,
            summary_guard: Regex::new(
                r"(?i)^\s*TOTALS?\b|(?i)YEAR[- ]TO[- ]DATE|(?i)INTEREST\s+CHARGE",
            )?,
        })
    }

    fn line_date(&self, ln: &str) -> Option<NaiveDate> {
        let found = self.date_anywhere.find(ln)?;
        DateToken::from(found.as_str())
            .resolve(self.default_year)
            .ok()
    }

    fn first_amount(&self, ln: &str) -> Option<Decimal> {
        let found = self.amount_anywhere.find(ln)?;
        Decimal::try_from(AmountToken::from(found.as_str())).ok()
    }

    fn scan_balances(&self, ln: &str, out: &mut CreditCardStatement) {
        if out.new_balance.is_none() && self.new_balance.is_match(ln) {
            out.new_balance = self.first_amount(ln);
        }
        if out.previous_balance.is_none() && self.previous_balance.is_match(ln) {
            out.previous_balance = self.first_amount(ln);
        }
    }

    /// Amount for a flushed block: last line, then first line, then the
    /// remaining lines in reverse. Statements vary in where wrapped amounts
    /// land; this probing order is a compatibility requirement.
    fn block_amount(&self, lines: &[String]) -> Option<Decimal> {
        let mut order = Vec::with_capacity(lines.len());
        match lines.len() {
            0 => return None,
            1 => order.push(0),
            n => {
                order.push(n - 1);
                order.push(0);
                order.extend((1..n - 1).rev());
            }
        }

        for idx in order {
            for found in self.amount_anywhere.find_iter(&lines[idx]) {
                if let Ok(amount) = Decimal::try_from(AmountToken::from(found.as_str())) {
                    return Some(amount);
                }
            }
        }
        None
    }

    /// Blocks that never yield a parseable amount are dropped.
    fn flush(&self, block: Option<Block>, out: &mut Vec<Transaction>) {
        let Some(block) = block else {
            return;
        };
        if let Some(amount) = self.block_amount(&block.lines) {
            out.push(Transaction::from_lines(block.date, amount, None, block.lines));
        }
    }
}

impl StatementParser for CreditCardParser {
    type Output = CreditCardStatement;

    fn parse(&self, content: &str) -> StatementResult<CreditCardStatement> {
        let mut out = CreditCardStatement::default();
        let mut block: Option<Block> = None;
        let mut in_transactions = false;

        for line in content.lines() {
            let ln = line.trim();
            if ln.is_empty() {
                continue;
            }

            if !in_transactions {
                if let Some(date) = self.line_date(ln) {
                    // first date-bearing line ends the balance region
                    in_transactions = true;
                    block = Some(Block {
                        date,
                        lines: vec![ln.to_string()],
                    });
                } else {
                    self.scan_balances(ln, &mut out);
                }
                continue;
            }

            // cycle-summary lines flush without opening a new block
            if self.summary_guard.is_match(ln) {
                self.flush(block.take(), &mut out.transactions);
                continue;
            }

            if let Some(date) = self.line_date(ln) {
                self.flush(block.take(), &mut out.transactions);
                block = Some(Block {
                    date,
                    lines: vec![ln.to_string()],
                });
                continue;
            }

            if let Some(open) = block.as_mut() {
                open.lines.push(ln.to_string());
            }
        }

        self.flush(block.take(), &mut out.transactions);
        Ok(out)
    }

    fn is_supported(content: &str) -> bool {
        let upper = content.to_uppercase();
        upper.contains("NEW BALANCE") || upper.contains("PREVIOUS BALANCE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn parser() -> CreditCardParser {
        CreditCardParser::new(2024).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    const SAMPLE_STATEMENT: &str = r#"
ACCOUNT SUMMARY
Previous Balance $120.00
Payments and Credits ($45.00)
New Balance $165.30
Payment Due 25.00

01/05 COFFEE SHOP PORTLAND OR
CARD ENDING 9921 12.30
01/09 AIRLINE TICKETS
BOOKING REF X7Y2
78.00
01/12 PAYMENT RECEIVED THANK YOU (45.00)
01/20* BOOKSTORE 120.00
Totals Year-to-Date
Interest Charged 0.00
"#;

    #[test]
    fn test_parse_balances() {
        let statement = parser().parse(SAMPLE_STATEMENT).unwrap();
        assert_eq!(statement.previous_balance, Some(dec("120.00")));
        assert_eq!(statement.new_balance, Some(dec("165.30")));
    }

    #[test]
    fn test_parse_blocks() {
        let statement = parser().parse(SAMPLE_STATEMENT).unwrap();
        assert_eq!(statement.transactions.len(), 4);

        let coffee = &statement.transactions[0];
        assert_eq!(coffee.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(coffee.amount, dec("12.30"));
        assert_eq!(
            coffee.description,
            "01/05 COFFEE SHOP PORTLAND OR CARD ENDING 9921 12.30"
        );
        assert_eq!(coffee.section, None);

        // amount on a line of its own below the wrapped description
        let airline = &statement.transactions[1];
        assert_eq!(airline.amount, dec("78.00"));
        assert!(airline.description.contains("BOOKING REF X7Y2"));

        // payments keep their negative sign
        let payment = &statement.transactions[2];
        assert_eq!(payment.amount, dec("-45.00"));
    }

    #[test]
    fn test_footnote_glyph_after_date() {
        let statement = parser().parse(SAMPLE_STATEMENT).unwrap();
        let bookstore = &statement.transactions[3];
        assert_eq!(bookstore.date, NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
        assert_eq!(bookstore.amount, dec("120.00"));
    }

    #[test]
    fn test_guard_line_flushes_and_is_ignored() {
        // the guard flushed the 01/20 block; "Interest Charged 0.00" opened
        // no block of its own
        let statement = parser().parse(SAMPLE_STATEMENT).unwrap();
        assert!(
            statement
                .transactions
                .iter()
                .all(|t| !t.description.contains("Interest"))
        );
    }

    #[test]
    fn test_block_without_amount_is_dropped() {
        let text = r#"
New Balance $0.00
01/05 MEMBERSHIP RENEWAL NOTICE
SEE ENCLOSED INSERT
"#;
        let statement = parser().parse(text).unwrap();
        assert!(statement.transactions.is_empty());
    }

    #[test]
    fn test_missing_labels_leave_balances_absent() {
        let text = r#"
CARDMEMBER STATEMENT
01/05 COFFEE SHOP 12.30
"#;
        let statement = parser().parse(text).unwrap();
        assert_eq!(statement.previous_balance, None);
        assert_eq!(statement.new_balance, None);
        assert_eq!(statement.transactions.len(), 1);
    }

    #[test]
    fn test_first_balance_label_occurrence_wins() {
        let text = r#"
Previous Balance $120.00
Previous Balance $999.99
New Balance $165.30
01/05 COFFEE SHOP 12.30
"#;
        let statement = parser().parse(text).unwrap();
        assert_eq!(statement.previous_balance, Some(dec("120.00")));
    }

    #[rstest]
    #[case("prior balance 10.00", Some("10.00"))]
    #[case("beginning balance 22.50", Some("22.50"))]
    #[case("opening total 22.50", None)]
    fn test_previous_balance_label_variants(#[case] line: &str, #[case] expected: Option<&str>) {
        let p = parser();
        let mut out = CreditCardStatement::default();
        p.scan_balances(line, &mut out);
        assert_eq!(out.previous_balance, expected.map(dec));
    }

    #[test]
    fn test_block_amount_probes_last_then_first_then_reverse() {
        let p = parser();

        // amount only on the last line
        let lines = vec![
            "01/05 STORE".to_string(),
            "DETAIL".to_string(),
            "9.99".to_string(),
        ];
        assert_eq!(p.block_amount(&lines), Some(dec("9.99")));

        // last line bare, first line carries the amount
        let lines = vec![
            "01/05 STORE 12.30".to_string(),
            "DETAIL".to_string(),
            "REFERENCE".to_string(),
        ];
        assert_eq!(p.block_amount(&lines), Some(dec("12.30")));

        // neither edge: remaining lines probed in reverse order
        let lines = vec![
            "01/05 STORE".to_string(),
            "MID 1.11".to_string(),
            "MID 2.22".to_string(),
            "REFERENCE".to_string(),
        ];
        assert_eq!(p.block_amount(&lines), Some(dec("2.22")));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let p = parser();
        assert_eq!(
            p.parse(SAMPLE_STATEMENT).unwrap(),
            p.parse(SAMPLE_STATEMENT).unwrap()
        );
    }

    #[rstest]
    #[case("Your New Balance is shown above", true)]
    #[case("PREVIOUS BALANCE 10.00", true)]
    #[case("DEPOSITS AND ADDITIONS", false)]
    #[case("random text", false)]
    fn test_is_supported(#[case] content: &str, #[case] expected: bool) {
        assert_eq!(CreditCardParser::is_supported(content), expected);
    }
}
