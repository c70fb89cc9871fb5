use thiserror::Error;

/// Reasons a raw RPC token account is rejected before aggregation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("account {0} was not returned in jsonParsed encoding")]
    NotParsed(String),

    #[error("account {0} has no parsed token account info")]
    MissingInfo(String),

    #[error("account {account} has malformed token account info: {reason}")]
    MalformedInfo { account: String, reason: String },

    #[error("account {0} has no mint")]
    MissingMint(String),

    #[error("account {account} has invalid mint '{mint}'")]
    InvalidMint { account: String, mint: String },
}
