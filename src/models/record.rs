use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use solana_account_decoder::UiAccountData;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

use super::namespace::ProgramNamespace;
use crate::error::RecordError;
use crate::utils::to_human;

/// One token account, validated and ready for aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct TokenAccountRecord {
    pub address: String,
    pub mint: String,
    pub owner: String,
    /// Amount scaled by the mint's decimals; `None` if it could not be resolved
    pub ui_amount: Option<Decimal>,
    pub program_namespace: ProgramNamespace,
}

/// `parsed.info` of a jsonParsed token account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAccountInfo {
    mint: Option<String>,
    owner: Option<String>,
    token_amount: Option<ParsedTokenAmount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParsedTokenAmount {
    amount: Option<String>,
    decimals: Option<u8>,
    ui_amount: Option<f64>,
    ui_amount_string: Option<String>,
}

impl ParsedTokenAmount {
    /// Prefer the exact decimal string, then the raw base units, then the float
    fn resolve(&self) -> Option<Decimal> {
        if let Some(amount) = self
            .ui_amount_string
            .as_deref()
            .and_then(|s| Decimal::from_str(s.trim()).ok())
        {
            return Some(amount);
        }

        let raw = self.amount.as_deref().and_then(|a| a.parse::<u64>().ok());
        if let (Some(raw), Some(decimals)) = (raw, self.decimals) {
            if let Some(amount) = to_human(raw, decimals) {
                return Some(amount);
            }
        }

        self.ui_amount.and_then(Decimal::from_f64)
    }
}

impl TokenAccountRecord {
    pub fn new(
        mint: impl Into<String>,
        ui_amount: Option<Decimal>,
        program_namespace: ProgramNamespace,
    ) -> Self {
        Self {
            address: String::new(),
            mint: mint.into(),
            owner: String::new(),
            ui_amount,
            program_namespace,
        }
    }

    /// Validate a `getTokenAccountsByOwner` result entry
    pub fn from_keyed_account(
        account: &RpcKeyedAccount,
        program_namespace: ProgramNamespace,
    ) -> Result<Self, RecordError> {
        let address = account.pubkey.clone();

        let parsed = match &account.account.data {
            UiAccountData::Json(parsed) => parsed,
            _ => return Err(RecordError::NotParsed(address)),
        };

        let info = parsed
            .parsed
            .get("info")
            .cloned()
            .ok_or_else(|| RecordError::MissingInfo(address.clone()))?;

        let info: ParsedTokenAccountInfo =
            serde_json::from_value(info).map_err(|e| RecordError::MalformedInfo {
                account: address.clone(),
                reason: e.to_string(),
            })?;

        let mint = match info.mint {
            Some(mint) if !mint.trim().is_empty() => mint.trim().to_string(),
            _ => return Err(RecordError::MissingMint(address)),
        };

        if Pubkey::from_str(&mint).is_err() {
            return Err(RecordError::InvalidMint { account: address, mint });
        }

        let ui_amount = info.token_amount.as_ref().and_then(ParsedTokenAmount::resolve);

        Ok(Self {
            address,
            mint,
            owner: info.owner.unwrap_or_default(),
            ui_amount,
            program_namespace,
        })
    }
}
