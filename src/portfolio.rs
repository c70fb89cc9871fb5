use anyhow::{anyhow, Result};
use futures::future::join_all;
use log::{info, warn};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::time::Instant;

use crate::aggregate::{aggregate, sort_by_mint};
use crate::metrics::CycleMetrics;
use crate::models::{AggregatedBalance, ProgramNamespace, TokenAccountRecord};
use crate::rpc::TokenAccountSource;

/// What to do when some, but not all, token program fetches fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartialFailurePolicy {
    /// Any failed fetch fails the whole cycle
    #[default]
    Abort,
    /// Aggregate whatever succeeded and report the failures
    Continue,
}

impl fmt::Display for PartialFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartialFailurePolicy::Abort => f.write_str("abort"),
            PartialFailurePolicy::Continue => f.write_str("continue"),
        }
    }
}

/// Result of one fetch-and-aggregate cycle
#[derive(Debug, Clone)]
pub struct BalanceReport {
    /// Sorted by mint
    pub balances: Vec<AggregatedBalance>,
    /// Namespaces whose fetch failed under [`PartialFailurePolicy::Continue`]
    pub failed: Vec<ProgramNamespace>,
    pub metrics: CycleMetrics,
}

/// Fetch every requested namespace concurrently, then aggregate by mint
pub async fn fetch_balances<S: TokenAccountSource>(
    source: &S,
    owner: &Pubkey,
    namespaces: &[ProgramNamespace],
    policy: PartialFailurePolicy,
) -> Result<BalanceReport> {
    if namespaces.is_empty() {
        return Err(anyhow!("No token program namespaces to query"));
    }

    let mut metrics = CycleMetrics::start_cycle();

    let fetch_start = Instant::now();
    let results = join_all(
        namespaces
            .iter()
            .map(|namespace| source.fetch_accounts(owner, *namespace)),
    )
    .await;
    metrics.fetch_ms = fetch_start.elapsed().as_millis() as u64;

    let mut records = Vec::new();
    let mut failed = Vec::new();
    let mut first_error = None;

    for (namespace, result) in namespaces.iter().zip(results) {
        let accounts = match result {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("Failed to fetch {} accounts: {}", namespace, e);
                failed.push(*namespace);
                first_error.get_or_insert(e);
                continue;
            }
        };

        metrics.accounts_per_namespace.push((*namespace, accounts.len()));

        for account in &accounts {
            match TokenAccountRecord::from_keyed_account(account, *namespace) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Skipping token account: {}", e);
                    metrics.records_rejected += 1;
                }
            }
        }
    }

    if let Some(e) = first_error {
        if policy == PartialFailurePolicy::Abort || failed.len() == namespaces.len() {
            return Err(e.context(format!("Balance fetch failed for owner {}", owner)));
        }
    }

    let aggregate_start = Instant::now();
    let mut balances = aggregate(&records);
    sort_by_mint(&mut balances);
    metrics.aggregate_ms = aggregate_start.elapsed().as_millis() as u64;

    metrics.records_accepted = records.len();
    metrics.distinct_mints = balances.len();

    info!(
        "Aggregated {} token accounts into {} mints for {}",
        records.len(),
        balances.len(),
        owner
    );

    Ok(BalanceReport {
        balances,
        failed,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::fixtures::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use solana_client::rpc_response::RpcKeyedAccount;
    use std::str::FromStr;

    /// Canned responses per namespace; `None` simulates an RPC failure
    struct FakeSource {
        token: Option<Vec<RpcKeyedAccount>>,
        token_2022: Option<Vec<RpcKeyedAccount>>,
    }

    impl TokenAccountSource for FakeSource {
        async fn fetch_accounts(
            &self,
            _owner: &Pubkey,
            namespace: ProgramNamespace,
        ) -> Result<Vec<RpcKeyedAccount>> {
            let response = match namespace {
                ProgramNamespace::Token => &self.token,
                ProgramNamespace::Token2022 => &self.token_2022,
            };
            response
                .clone()
                .ok_or_else(|| anyhow!("RPC node unavailable for {}", namespace))
        }
    }

    fn owner() -> Pubkey {
        Pubkey::from_str(OWNER).unwrap()
    }

    fn both_programs() -> FakeSource {
        FakeSource {
            token: Some(vec![
                token_account("a1", ProgramNamespace::Token, USDC, "5"),
                token_account("a2", ProgramNamespace::Token, BONK, "1000.5"),
            ]),
            token_2022: Some(vec![token_account("a3", ProgramNamespace::Token2022, USDC, "3")]),
        }
    }

    #[test]
    fn test_merges_namespaces() {
        let report = tokio_test::block_on(fetch_balances(
            &both_programs(),
            &owner(),
            &ProgramNamespace::ALL,
            PartialFailurePolicy::Abort,
        ))
        .unwrap();

        assert_eq!(
            report.balances,
            vec![
                AggregatedBalance::new(BONK, dec!(1000.5)),
                AggregatedBalance::new(USDC, dec!(8)),
            ]
        );
        assert!(report.failed.is_empty());
        assert_eq!(report.metrics.total_accounts(), 3);
        assert_eq!(report.metrics.distinct_mints, 2);
    }

    #[test]
    fn test_only_requested_namespaces() {
        let report = tokio_test::block_on(fetch_balances(
            &both_programs(),
            &owner(),
            &[ProgramNamespace::Token2022],
            PartialFailurePolicy::Abort,
        ))
        .unwrap();

        assert_eq!(report.balances, vec![AggregatedBalance::new(USDC, dec!(3))]);
    }

    #[test]
    fn test_no_accounts_is_empty() {
        let source = FakeSource {
            token: Some(vec![]),
            token_2022: Some(vec![]),
        };
        let report = tokio_test::block_on(fetch_balances(
            &source,
            &owner(),
            &ProgramNamespace::ALL,
            PartialFailurePolicy::Abort,
        ))
        .unwrap();
        assert!(report.balances.is_empty());
    }

    #[test]
    fn test_abort_on_partial_failure() {
        let source = FakeSource {
            token_2022: None,
            ..both_programs()
        };
        let err = tokio_test::block_on(fetch_balances(
            &source,
            &owner(),
            &ProgramNamespace::ALL,
            PartialFailurePolicy::Abort,
        ))
        .unwrap_err();
        assert!(format!("{:#}", err).contains("RPC node unavailable for token-2022"));
    }

    #[test]
    fn test_continue_on_partial_failure() {
        let source = FakeSource {
            token_2022: None,
            ..both_programs()
        };
        let report = tokio_test::block_on(fetch_balances(
            &source,
            &owner(),
            &ProgramNamespace::ALL,
            PartialFailurePolicy::Continue,
        ))
        .unwrap();

        assert_eq!(report.failed, vec![ProgramNamespace::Token2022]);
        assert_eq!(
            report.balances,
            vec![
                AggregatedBalance::new(BONK, dec!(1000.5)),
                AggregatedBalance::new(USDC, dec!(5)),
            ]
        );
    }

    #[test]
    fn test_continue_fails_when_everything_fails() {
        let source = FakeSource {
            token: None,
            token_2022: None,
        };
        let result = tokio_test::block_on(fetch_balances(
            &source,
            &owner(),
            &ProgramNamespace::ALL,
            PartialFailurePolicy::Continue,
        ));
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let source = FakeSource {
            token: Some(vec![
                token_account("a1", ProgramNamespace::Token, USDC, "5"),
                keyed_account("bad", ProgramNamespace::Token, json!({ "info": { "owner": OWNER } })),
            ]),
            token_2022: Some(vec![]),
        };
        let report = tokio_test::block_on(fetch_balances(
            &source,
            &owner(),
            &ProgramNamespace::ALL,
            PartialFailurePolicy::Abort,
        ))
        .unwrap();

        assert_eq!(report.balances, vec![AggregatedBalance::new(USDC, dec!(5))]);
        assert_eq!(report.metrics.records_accepted, 1);
        assert_eq!(report.metrics.records_rejected, 1);
    }

    #[test]
    fn test_no_namespaces_is_an_error() {
        let result = tokio_test::block_on(fetch_balances(
            &both_programs(),
            &owner(),
            &[],
            PartialFailurePolicy::Abort,
        ));
        assert!(result.is_err());
    }
}
