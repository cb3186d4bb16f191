//! Checking/deposit statement parser (PDF-extracted text).
//!
//! Expected section shape:
//!   DEPOSITS AND ADDITIONS
//!   07/15 08/15 ACH DEPOSIT WIDGETS INC                10,000.00
//!   07/20       REMOTE DEPOSIT                          5,000.00
//!   TOTAL DEPOSITS AND ADDITIONS                       15,000.00

use chrono::NaiveDate;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::types::{CheckingStatement, SectionTotal, UnparsedLine};
use crate::errors::StatementResult;
use crate::parsers::tokens::{AMOUNT_PATTERN, AmountToken, DATE_PATTERN, DateToken};
use crate::parsers::traits::StatementParser;
use crate::types::{Section, Transaction, flatten_lines};

/// Transaction record still accumulating continuation lines.
#[derive(Debug, Clone, PartialEq)]
struct OpenRecord {
    date: NaiveDate,
    amount: Decimal,
    lines: Vec<String>,
}

/// Two-line header: date and description captured, amount still expected.
#[derive(Debug, Clone, PartialEq)]
struct PendingRecord {
    date: NaiveDate,
    lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    InSection(Section),
    OpenRecord(Section, OpenRecord),
    PendingHeader(Section, PendingRecord),
}

impl State {
    fn section(&self) -> Option<Section> {
        match self {
            State::Idle => None,
            State::InSection(section)
            | State::OpenRecord(section, _)
            | State::PendingHeader(section, _) => Some(*section),
        }
    }
}

pub struct CheckingParser {
    default_year: i32,
    sect_deposits: Regex,
    sect_withdrawals: Regex,
    sect_fees: Regex,
    sect_daily_balance: Regex,
    line_total: Regex,
    strict_header: Regex,
    bare_header: Regex,
    amount_tail: Regex,
    amount_anywhere: Regex,
    date_anywhere: Regex,
}

impl CheckingParser {
    pub fn new(default_year: i32) -> StatementResult<Self> {
        let date = DATE_PATTERN;
        let amount = AMOUNT_PATTERN;

        Ok(Self {
            default_year,
            sect_deposits: Regex::new(r"(?i)^\s*DEPOSITS\s+AND\s+ADDITIONS\b")?,
            sect_withdrawals: Regex::new(r"(?i)^\s*ELECTRONIC\s+WITHDRAWALS\b")?,
            sect_fees: Regex::new(r"(?i)^\s*FEES\b")?,
            sect_daily_balance: Regex::new(r"(?i)DAILY\s+ENDING\s+BALANCE")?,
            line_total: Regex::new(r"(?i)^\s*TOTAL\b")?,
            // one or two leading date tokens, description, trailing amount
            strict_header: Regex::new(&format!(
                r"^\s*(?P<d1>{date})(?:\s+(?P<d2>{date}))?\s+(?P<desc>.*?)\s+(?P<amount>{amount})\s*$"
            ))?,
            // leading date token(s) and description, no trailing amount
            bare_header: Regex::new(&format!(
                r"^\s*(?P<d1>{date})(?:\s+(?P<d2>{date}))?\s+(?P<desc>\S.*?)\s*$"
            ))?,
            amount_tail: Regex::new(&format!(r"(?P<amount>{amount})\s*$"))?,
            amount_anywhere: Regex::new(amount)?,
            date_anywhere: Regex::new(date)?,
        })
    }

    /// Classify one line and transition. Returns the next state plus the
    /// transaction finalized by this line, if any. Totals and unparsed lines
    /// are recorded on `out` directly.
    fn step(
        &self,
        state: State,
        line: &str,
        out: &mut CheckingStatement,
    ) -> (State, Option<Transaction>) {
        let ln = line.trim();
        if ln.is_empty() {
            return (state, None);
        }

        // Balance summary closes the page; later section markers can reopen
        if self.sect_daily_balance.is_match(ln) {
            let emitted = self.finalize(state, out);
            return (State::Idle, emitted);
        }

        if let Some(section) = self.section_marker(ln) {
            let emitted = self.finalize(state, out);
            return (State::InSection(section), emitted);
        }

        let Some(section) = state.section() else {
            // outside any section, lines are ignored
            return (state, None);
        };

        if self.line_total.is_match(ln) {
            if let Some(printed) = self.trailing_amount(ln) {
                out.section_totals.insert(
                    section,
                    SectionTotal {
                        section,
                        printed_amount: printed.abs(),
                    },
                );
            }
            let emitted = self.finalize(state, out);
            return (State::InSection(section), emitted);
        }

        // A pending two-line header claims the first amount to appear
        if let State::PendingHeader(section, mut pending) = state {
            if let Some(found) = self.amount_anywhere.find(ln) {
                if let Ok(amount) = Decimal::try_from(AmountToken::from(found.as_str())) {
                    let mut lines = pending.lines;
                    let lead = ln[..found.start()].trim();
                    if !lead.is_empty() {
                        lines.push(lead.to_string());
                    }
                    let record = OpenRecord {
                        date: pending.date,
                        amount,
                        lines,
                    };
                    return (State::OpenRecord(section, record), None);
                }
            }
            pending.lines.push(ln.to_string());
            return (State::PendingHeader(section, pending), None);
        }

        if let Some(caps) = self.strict_header.captures(ln) {
            let emitted = self.finalize(state, out);
            return match self.open_record(&caps) {
                Some(record) => (State::OpenRecord(section, record), emitted),
                None => {
                    push_unparsed(out, section, ln);
                    (State::InSection(section), emitted)
                }
            };
        }

        if let Some(caps) = self.bare_header.captures(ln) {
            let emitted = self.finalize(state, out);
            return match self.pending_record(&caps) {
                Some(pending) => (State::PendingHeader(section, pending), emitted),
                None => {
                    push_unparsed(out, section, ln);
                    (State::InSection(section), emitted)
                }
            };
        }

        // loose header: date token anywhere in the line, amount at line end
        if let Some(caps) = self.amount_tail.captures(ln) {
            if let Some(found) = caps.name("amount") {
                let lead = &ln[..found.start()];
                if let Some(date_match) = self.date_anywhere.find(lead) {
                    let emitted = self.finalize(state, out);
                    let date = DateToken::from(date_match.as_str())
                        .resolve(self.default_year)
                        .ok();
                    let amount = Decimal::try_from(AmountToken::from(found.as_str())).ok();
                    return match (date, amount) {
                        (Some(date), Some(amount)) => {
                            let record = OpenRecord {
                                date,
                                amount,
                                lines: vec![lead.trim().to_string()],
                            };
                            (State::OpenRecord(section, record), emitted)
                        }
                        _ => {
                            push_unparsed(out, section, ln);
                            (State::InSection(section), emitted)
                        }
                    };
                }
            }
        }

        // continuation lines extend the open record, cut at any amount
        if let State::OpenRecord(section, mut record) = state {
            let text = match self.amount_anywhere.find(ln) {
                Some(found) => ln[..found.start()].trim(),
                None => ln,
            };
            if !text.is_empty() {
                record.lines.push(text.to_string());
            }
            return (State::OpenRecord(section, record), None);
        }

        push_unparsed(out, section, ln);
        (State::InSection(section), None)
    }

    fn section_marker(&self, ln: &str) -> Option<Section> {
        if self.sect_deposits.is_match(ln) {
            Some(Section::Deposit)
        } else if self.sect_withdrawals.is_match(ln) {
            Some(Section::Withdrawal)
        } else if self.sect_fees.is_match(ln) {
            Some(Section::Fee)
        } else {
            None
        }
    }

    fn trailing_amount(&self, ln: &str) -> Option<Decimal> {
        let caps = self.amount_tail.captures(ln)?;
        let token = caps.name("amount")?;
        Decimal::try_from(AmountToken::from(token.as_str())).ok()
    }

    fn open_record(&self, caps: &Captures<'_>) -> Option<OpenRecord> {
        let token = caps.name("d2").or_else(|| caps.name("d1"))?;
        let date = DateToken::from(token.as_str())
            .resolve(self.default_year)
            .ok()?;
        let amount = Decimal::try_from(AmountToken::from(caps.name("amount")?.as_str())).ok()?;
        let desc = caps.name("desc")?.as_str().trim().to_string();
        Some(OpenRecord {
            date,
            amount,
            lines: vec![desc],
        })
    }

    fn pending_record(&self, caps: &Captures<'_>) -> Option<PendingRecord> {
        let token = caps.name("d2").or_else(|| caps.name("d1"))?;
        let date = DateToken::from(token.as_str())
            .resolve(self.default_year)
            .ok()?;
        let desc = caps.name("desc")?.as_str().trim().to_string();
        Some(PendingRecord {
            date,
            lines: vec![desc],
        })
    }

    fn finalize(&self, state: State, out: &mut CheckingStatement) -> Option<Transaction> {
        match state {
            State::OpenRecord(section, record) => Some(Transaction::from_lines(
                record.date,
                record.amount,
                Some(section),
                record.lines,
            )),
            State::PendingHeader(section, pending) => {
                // the amount never arrived; keep the text for diagnostics
                push_unparsed(out, section, &flatten_lines(&pending.lines));
                None
            }
            State::Idle | State::InSection(_) => None,
        }
    }
}

fn push_unparsed(out: &mut CheckingStatement, section: Section, raw_text: &str) {
    out.unparsed.entry(section).or_default().push(UnparsedLine {
        section,
        raw_text: raw_text.to_string(),
    });
}

impl StatementParser for CheckingParser {
    type Output = CheckingStatement;

    fn parse(&self, content: &str) -> StatementResult<CheckingStatement> {
        let mut out = CheckingStatement::default();
        let mut state = State::Idle;

        for line in content.lines() {
            let (next, emitted) = self.step(state, line, &mut out);
            state = next;
            if let Some(transaction) = emitted {
                out.transactions.push(transaction);
            }
        }

        if let Some(transaction) = self.finalize(state, &mut out) {
            out.transactions.push(transaction);
        }

        Ok(out)
    }

    fn is_supported(content: &str) -> bool {
        let upper = content.to_uppercase();
        upper.contains("DEPOSITS AND ADDITIONS")
            || upper.contains("ELECTRONIC WITHDRAWALS")
            || upper.contains("DAILY ENDING BALANCE")
    }
}
