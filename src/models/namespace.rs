use anyhow::{anyhow, Result};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

use crate::utils::{parse_pubkey, TOKEN_2022_PROGRAM_ID};

/// Token program that owns a token account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgramNamespace {
    /// Original SPL Token program
    Token,
    /// Token-2022 (token extensions)
    Token2022,
}

impl ProgramNamespace {
    pub const ALL: [ProgramNamespace; 2] = [ProgramNamespace::Token, ProgramNamespace::Token2022];

    /// On-chain program id used as the account listing filter
    pub fn program_id(&self) -> Result<Pubkey> {
        match self {
            ProgramNamespace::Token => Ok(spl_token::id()),
            ProgramNamespace::Token2022 => parse_pubkey(TOKEN_2022_PROGRAM_ID, "program id"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProgramNamespace::Token => "token",
            ProgramNamespace::Token2022 => "token-2022",
        }
    }

    /// Parse a comma or whitespace separated list, e.g. "token,token-2022".
    /// Duplicates are dropped, first occurrence wins.
    pub fn parse_list(list: &str) -> Result<Vec<ProgramNamespace>> {
        let mut namespaces = Vec::new();
        for item in list.split(|c: char| c == ',' || c.is_whitespace()) {
            if item.is_empty() {
                continue;
            }
            let namespace = item.parse::<ProgramNamespace>()?;
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }

        if namespaces.is_empty() {
            return Err(anyhow!("At least one token program namespace is required"));
        }
        Ok(namespaces)
    }
}

impl FromStr for ProgramNamespace {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" | "spl-token" | "std" => Ok(ProgramNamespace::Token),
            "token-2022" | "token2022" | "spl-token-2022" | "2022" => Ok(ProgramNamespace::Token2022),
            other => Err(anyhow!(
                "Unrecognized token program: {}. Must be token or token-2022",
                other
            )),
        }
    }
}

impl fmt::Display for ProgramNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
