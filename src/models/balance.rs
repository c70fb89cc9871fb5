use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Total holdings of one mint, summed over every token account and program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedBalance {
    pub mint: String,
    pub balance: Decimal,
}

impl AggregatedBalance {
    pub fn new(mint: impl Into<String>, balance: Decimal) -> Self {
        Self {
            mint: mint.into(),
            balance,
        }
    }
}
