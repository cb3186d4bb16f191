pub mod parser;
pub mod types;

pub mod prelude {
    pub use super::parser::CreditCardParser;
    pub use super::types::CreditCardStatement;
}
