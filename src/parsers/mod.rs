pub mod checking;
pub mod credit_card;
pub mod tokens;
pub mod traits;

pub mod prelude {
    pub use super::checking::prelude::*;
    pub use super::credit_card::prelude::*;
    pub use super::tokens::{AmountToken, DateToken};
    pub use super::traits::StatementParser;
}
