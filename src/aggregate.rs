use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{AggregatedBalance, TokenAccountRecord};

/// Sum token account balances by mint, across every program namespace.
///
/// Records without a resolvable amount count as zero, but their mint is still
/// reported. A total that would exceed `Decimal::MAX` is clamped to it.
/// Output order is unspecified; use [`sort_by_mint`] for display.
pub fn aggregate(records: &[TokenAccountRecord]) -> Vec<AggregatedBalance> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();

    for record in records {
        let amount = record.ui_amount.unwrap_or(Decimal::ZERO);
        let total = totals.entry(record.mint.as_str()).or_insert(Decimal::ZERO);
        *total = total.saturating_add(amount);
    }

    totals
        .into_iter()
        .map(|(mint, balance)| AggregatedBalance::new(mint, balance))
        .collect()
}

/// Stable display order: ascending by mint
pub fn sort_by_mint(balances: &mut [AggregatedBalance]) {
    balances.sort_by(|a, b| a.mint.cmp(&b.mint));
}
