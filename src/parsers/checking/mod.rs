pub mod parser;
pub mod types;

pub mod prelude {
    pub use super::parser::CheckingParser;
    pub use super::types::{CheckingStatement, SectionTotal, UnparsedLine};
}
