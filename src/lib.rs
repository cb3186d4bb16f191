//! Parse and reconcile bank and credit card statements from PDF-extracted
//! text.
//!
//! ```rust,ignore
//! use statement_reconcile_rs::ParserBuilder;
//!
//! let statement = ParserBuilder::new()
//!     .content(&statement_text)
//!     .default_year(2024)
//!     .parse_reconciled()?;
//! ```

mod builder;
mod types;

pub mod errors;
pub mod parsers;
pub mod reconcile;
pub mod register;

pub use builder::{DEFAULT_STATEMENT_YEAR, ParsedStatement, ParserBuilder, StatementFormat};
pub use parsers::prelude::*;
pub use reconcile::{ReconcileReport, Reconciler, SectionMismatch};
pub use register::{CategoryRule, Register, RegisterRow};
pub use types::{Section, Transaction};
