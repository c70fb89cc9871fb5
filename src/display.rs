use anyhow::Result;
use std::fmt::Write;

use crate::models::AggregatedBalance;

pub const NOT_CONNECTED: &str = "No wallet connected. Pass --owner or --keypair to view your tokens.";
pub const NO_TOKENS: &str = "No tokens found.";

/// Default width of the mint column before truncation
pub const DEFAULT_MINT_WIDTH: usize = 20;

const ELLIPSIS: &str = "...";

/// Shorten a mint to `max` characters, keeping both ends visible
pub fn truncate_mint(mint: &str, max: usize) -> String {
    let len = mint.chars().count();
    if len <= max || max <= ELLIPSIS.len() {
        return mint.to_string();
    }

    let keep = max - ELLIPSIS.len();
    let head = keep.div_ceil(2);
    let tail = keep / 2;

    let start: String = mint.chars().take(head).collect();
    let end: String = mint.chars().skip(len - tail).collect();
    format!("{}{}{}", start, ELLIPSIS, end)
}

/// Mint/Balance table, or the empty state when there is nothing to show
pub fn render_table(balances: &[AggregatedBalance], mint_width: usize) -> String {
    if balances.is_empty() {
        return NO_TOKENS.to_string();
    }

    let rows: Vec<(String, String)> = balances
        .iter()
        .map(|b| (truncate_mint(&b.mint, mint_width), b.balance.normalize().to_string()))
        .collect();

    let mint_col = rows.iter().map(|(m, _)| m.len()).max().unwrap_or(0).max("Mint".len());
    let balance_col = rows.iter().map(|(_, b)| b.len()).max().unwrap_or(0).max("Balance".len());

    let mut out = String::from("Your Tokens\n");
    let _ = writeln!(out, "{:<mint_col$}  {:>balance_col$}", "Mint", "Balance");
    let _ = writeln!(out, "{}  {}", "-".repeat(mint_col), "-".repeat(balance_col));
    for (mint, balance) in rows {
        let _ = writeln!(out, "{:<mint_col$}  {:>balance_col$}", mint, balance);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Full, untruncated balances as a JSON array
pub fn render_json(balances: &[AggregatedBalance]) -> Result<String> {
    Ok(serde_json::to_string_pretty(balances)?)
}
