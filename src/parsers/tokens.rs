use crate::errors::StatementParseError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Date token grammar: `MM/DD` with an optional 2- or 4-digit year.
/// Non-capturing so parsers can wrap it in their own named groups.
pub(crate) const DATE_PATTERN: &str = r"(?:0[1-9]|1[0-2])/(?:0[1-9]|[12]\d|3[01])(?:/(?:\d{4}|\d{2}))?";

/// Amount token grammar: optional `(` or `-`, optional `$`, optional
/// thousands-grouped or bare integer part, exactly two fractional digits,
/// optional trailing `)`.
pub(crate) const AMOUNT_PATTERN: &str = r"[\(\-]?\$?(?:\d{1,3}(?:,\d{3})+|\d+)?\.\d{2}\)?";

/// A textual amount lifted from a statement line, e.g. `(1,204.21)` or
/// `$500.00`.
///
/// Parenthesized and minus-prefixed forms normalize to the same negative
/// value; currency symbols, thousands separators and stray trailing glyphs
/// (statement footnote marks) are stripped before conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountToken(String);

impl From<String> for AmountToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AmountToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl TryFrom<AmountToken> for Decimal {
    type Error = StatementParseError;

    fn try_from(token: AmountToken) -> Result<Self, Self::Error> {
        let mut text = token.0.trim().replace('$', "").replace(',', "");

        let mut negative = false;
        if text.starts_with('(') && text.ends_with(')') {
            negative = true;
            text = text[1..text.len() - 1].to_string();
        }
        if let Some(rest) = text.strip_prefix('-') {
            negative = true;
            text = rest.to_string();
        }

        // Footnote glyphs trail the cents digits on some statements
        let clean = text.trim_end_matches(|c: char| !c.is_ascii_digit());
        // the integer part is optional in the token grammar
        let clean = if clean.starts_with('.') {
            format!("0{clean}")
        } else {
            clean.to_string()
        };

        let mut value: Decimal = clean
            .parse()
            .map_err(|_| StatementParseError::AmountInvalidFormat)?;
        value.rescale(2);

        Ok(if negative { -value } else { value })
    }
}

/// A two-field date token (`MM/DD`) with an optional year, e.g. `07/15` or
/// `07/15/24`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateToken(String);

impl From<String> for DateToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DateToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl DateToken {
    /// Resolve the token to a calendar date. A missing year falls back to
    /// `default_year`; 2-digit years resolve to the 2000s.
    pub fn resolve(&self, default_year: i32) -> Result<NaiveDate, StatementParseError> {
        let mut fields = self.0.trim().split('/');

        let month: u32 = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or(StatementParseError::DateInvalidFormat)?;
        let day: u32 = fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or(StatementParseError::DateInvalidFormat)?;

        let year = match fields.next() {
            Some(raw) => {
                let year: i32 = raw
                    .parse()
                    .map_err(|_| StatementParseError::DateInvalidFormat)?;
                if year < 100 { 2000 + year } else { year }
            }
            None => default_year,
        };

        NaiveDate::from_ymd_opt(year, month, day).ok_or(StatementParseError::DateInvalidFormat)
    }
}
