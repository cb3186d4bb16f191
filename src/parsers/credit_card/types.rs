use crate::types::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Everything one pass over a credit-card statement produces. Either balance
/// may be absent when its label never appears in the balance region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditCardStatement {
    pub transactions: Vec<Transaction>,
    pub previous_balance: Option<Decimal>,
    pub new_balance: Option<Decimal>,
}
