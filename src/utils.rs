use anyhow::{anyhow, Result};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;

/// Token-2022 (token extensions) program
pub const TOKEN_2022_PROGRAM_ID: &str = "TokenzQdBNbLqP5VEhdkAS6EPFLclcXnD4eSdZa6";

/// Largest decimals value whose scale factor still fits in a u64
const MAX_DECIMALS: u8 = 19;

/// Parse a base58 address, naming what it was supposed to be on failure
pub fn parse_pubkey(value: &str, what: &str) -> Result<Pubkey> {
    Pubkey::from_str(value.trim()).map_err(|e| anyhow!("Invalid {} '{}': {}", what, value, e))
}

/// Convert base unit amount to human-readable format with decimals.
///
/// Returns `None` when the scale factor would overflow.
pub fn to_human(amount: u64, decimals: u8) -> Option<Decimal> {
    if decimals > MAX_DECIMALS {
        return None;
    }
    let divisor = 10u64.checked_pow(decimals as u32)?;
    Decimal::from(amount).checked_div(Decimal::from(divisor))
}

/// Async sleep utility
pub async fn wait(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_to_human() {
        // 1 USDC = 1_000_000 base units (6 decimals)
        assert_eq!(to_human(1_000_000, 6), Some(dec!(1)));

        // 0.5 SOL
        assert_eq!(to_human(500_000_000, 9), Some(dec!(0.5)));

        assert_eq!(to_human(42, 0), Some(dec!(42)));
    }

    #[test]
    fn test_to_human_rejects_oversized_decimals() {
        assert_eq!(to_human(1, 20), None);
        assert_eq!(to_human(u64::MAX, 255), None);
    }

    #[test]
    fn test_program_ids() {
        let token = spl_token::id();
        assert_eq!(token.to_string(), "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

        let token_2022 = parse_pubkey(TOKEN_2022_PROGRAM_ID, "program id").unwrap();
        assert_ne!(token, token_2022);
    }

    #[test]
    fn test_parse_pubkey_error_names_field() {
        let err = parse_pubkey("not-a-key", "owner").unwrap_err();
        assert!(err.to_string().contains("owner"));
    }
}
