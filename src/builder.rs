use std::fs;

use crate::errors::{StatementParseError, StatementResult};
use crate::parsers::prelude::*;
use crate::reconcile::Reconciler;
use crate::types::Transaction;
use serde::{Deserialize, Serialize};

/// Fallback statement-period year for rows whose dates omit one.
pub const DEFAULT_STATEMENT_YEAR: i32 = 2024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParsedStatement {
    Checking(CheckingStatement),
    CreditCard(CreditCardStatement),
}

impl ParsedStatement {
    pub fn transactions(&self) -> &[Transaction] {
        match self {
            ParsedStatement::Checking(statement) => &statement.transactions,
            ParsedStatement::CreditCard(statement) => &statement.transactions,
        }
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        match self {
            ParsedStatement::Checking(statement) => statement.transactions,
            ParsedStatement::CreditCard(statement) => statement.transactions,
        }
    }
}

impl TryFrom<ParsedStatement> for CheckingStatement {
    type Error = StatementParseError;

    fn try_from(parsed: ParsedStatement) -> Result<Self, Self::Error> {
        match parsed {
            ParsedStatement::Checking(statement) => Ok(statement),
            ParsedStatement::CreditCard(_) => Err(StatementParseError::UnsupportedFormat),
        }
    }
}

impl TryFrom<ParsedStatement> for CreditCardStatement {
    type Error = StatementParseError;

    fn try_from(parsed: ParsedStatement) -> Result<Self, Self::Error> {
        match parsed {
            ParsedStatement::CreditCard(statement) => Ok(statement),
            ParsedStatement::Checking(_) => Err(StatementParseError::UnsupportedFormat),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementFormat {
    #[serde(rename = "checking")]
    Checking,
    #[serde(rename = "credit_card")]
    CreditCard,
}

impl StatementFormat {
    fn parse(&self, content: &str, default_year: i32) -> StatementResult<ParsedStatement> {
        match self {
            StatementFormat::Checking => {
                let parser = CheckingParser::new(default_year)?;
                Ok(ParsedStatement::Checking(parser.parse(content)?))
            }
            StatementFormat::CreditCard => {
                let parser = CreditCardParser::new(default_year)?;
                Ok(ParsedStatement::CreditCard(parser.parse(content)?))
            }
        }
    }

    /// Checking markers are the more specific ones; probe them first.
    fn detect(content: Option<&str>) -> StatementResult<Self> {
        if let Some(content) = content {
            if CheckingParser::is_supported(content) {
                return Ok(StatementFormat::Checking);
            }
            if CreditCardParser::is_supported(content) {
                return Ok(StatementFormat::CreditCard);
            }
        }

        Err(StatementParseError::UnsupportedFormat)
    }
}

#[derive(Default)]
pub struct ParserBuilder {
    content: Option<String>,
    filepath: Option<String>,
    format: Option<StatementFormat>,
    default_year: Option<i32>,
    accept_mismatch: bool,
}

impl ParserBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: &str) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn filename(mut self, filename: &str) -> Self {
        self.filepath = Some(filename.to_string());
        self
    }

    pub fn format(mut self, format: StatementFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Year used to resolve dates that carry no explicit year, typically the
    /// statement period's year.
    pub fn default_year(mut self, year: i32) -> Self {
        self.default_year = Some(year);
        self
    }

    /// Accept parsed data even when reconciliation finds a mismatch.
    pub fn accept_mismatch(mut self, accept: bool) -> Self {
        self.accept_mismatch = accept;
        self
    }

    pub fn parse_into<T>(self) -> StatementResult<T>
    where
        T: TryFrom<ParsedStatement, Error = StatementParseError>,
    {
        self.parse().and_then(T::try_from)
    }

    pub fn parse(self) -> StatementResult<ParsedStatement> {
        let content = self.content
            .map(Ok)
            .unwrap_or_else(|| {
                self.filepath
                    .ok_or(StatementParseError::MissingContentAndFilepath)
                    .and_then(|path| fs::read_to_string(path).map_err(Into::into))
            })?;

        let format = self.format
            .map(Ok)
            .unwrap_or_else(|| StatementFormat::detect(Some(&content)))?;

        format.parse(&content, self.default_year.unwrap_or(DEFAULT_STATEMENT_YEAR))
    }

    /// Parse, then reconcile against the statement's printed totals. The
    /// mismatch override set on the builder decides whether a disagreement
    /// is a hard failure.
    pub fn parse_reconciled(self) -> StatementResult<ParsedStatement> {
        let accept_mismatch = self.accept_mismatch;
        let parsed = self.parse()?;

        let report = match &parsed {
            ParsedStatement::Checking(statement) => Reconciler::new().check_checking(statement),
            ParsedStatement::CreditCard(statement) => {
                Reconciler::new().check_credit_card(statement)
            }
        };
        report.into_result(accept_mismatch)?;

        Ok(parsed)
    }
}
