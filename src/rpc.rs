use anyhow::{anyhow, Result};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::TokenAccountsFilter;
use solana_client::rpc_response::RpcKeyedAccount;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;

use crate::models::ProgramNamespace;

/// Anything that can list an owner's token accounts for one token program
#[allow(async_fn_in_trait)]
pub trait TokenAccountSource {
    async fn fetch_accounts(
        &self,
        owner: &Pubkey,
        namespace: ProgramNamespace,
    ) -> Result<Vec<RpcKeyedAccount>>;
}

/// RPC client wrapper for token account queries
pub struct TokenRpcClient {
    client: RpcClient,
}

impl TokenRpcClient {
    /// Create new RPC client
    pub fn new(rpc_endpoint: &str, commitment: CommitmentConfig) -> Self {
        let client = RpcClient::new_with_commitment(rpc_endpoint.to_string(), commitment);
        Self { client }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

impl TokenAccountSource for TokenRpcClient {
    async fn fetch_accounts(
        &self,
        owner: &Pubkey,
        namespace: ProgramNamespace,
    ) -> Result<Vec<RpcKeyedAccount>> {
        let program_id = namespace.program_id()?;

        log::debug!("Fetching {} accounts for owner {}", namespace, owner);

        // jsonParsed is the client's default encoding for this call
        let accounts = self
            .client
            .get_token_accounts_by_owner(owner, TokenAccountsFilter::ProgramId(program_id))
            .await
            .map_err(|e| anyhow!("Failed to fetch {} accounts for {}: {}", namespace, owner, e))?;

        log::info!("Fetched {} {} accounts for {}", accounts.len(), namespace, owner);
        Ok(accounts)
    }
}
