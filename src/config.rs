use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{read_keypair_file, Signer};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::display::DEFAULT_MINT_WIDTH;
use crate::models::ProgramNamespace;
use crate::portfolio::PartialFailurePolicy;
use crate::utils::parse_pubkey;

/// Show an owner's SPL token balances, summed by mint across Token and Token-2022
#[derive(Debug, Default, Parser)]
#[command(name = "spl-balances", version, about)]
pub struct Cli {
    /// Address whose token accounts are listed [env: OWNER]
    #[arg(long)]
    pub owner: Option<String>,

    /// Keypair file of the wallet to inspect [env: SECRET_PATH]
    #[arg(long)]
    pub keypair: Option<String>,

    /// devnet, testnet or mainnet-beta [env: CLUSTER]
    #[arg(long)]
    pub cluster: Option<String>,

    /// Custom RPC endpoint, overrides the cluster URL [env: RPC_ENDPOINT]
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// processed, confirmed or finalized [env: COMMITMENT]
    #[arg(long)]
    pub commitment: Option<String>,

    /// Token programs to query, e.g. "token,token-2022" [env: NAMESPACES]
    #[arg(long)]
    pub namespaces: Option<String>,

    /// Still show balances when one token program fetch fails [env: ALLOW_PARTIAL]
    #[arg(long)]
    pub allow_partial: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Refresh every N milliseconds; 0 runs once [env: REFRESH_INTERVAL]
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Truncate mints in the table to this many characters
    #[arg(long)]
    pub mint_width: Option<usize>,

    /// TOML config file; keys are these flag names in snake_case
    /// (owner, keypair, cluster, rpc_url, commitment, namespaces,
    /// allow_partial, interval_ms, mint_width) plus output = "table" | "json"
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Solana cluster to query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Public RPC endpoint for the cluster
    pub fn url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
        }
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            other => Err(anyhow!(
                "Unrecognized cluster: {}. Must be devnet, testnet, or mainnet-beta",
                other
            )),
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Settings accepted from the optional TOML file; keys are the long flag
/// names in snake_case
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub owner: Option<String>,
    pub keypair: Option<String>,
    pub cluster: Option<String>,
    pub rpc_url: Option<String>,
    pub commitment: Option<String>,
    pub namespaces: Option<Vec<String>>,
    pub allow_partial: Option<bool>,
    pub output: Option<OutputFormat>,
    pub interval_ms: Option<u64>,
    pub mint_width: Option<usize>,
}

impl FileConfig {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid config file")
    }
}

/// Configuration for one run of the balance viewer
#[derive(Debug, Clone)]
pub struct Config {
    pub cluster: Cluster,
    pub rpc_endpoint: String,
    pub commitment: CommitmentConfig,
    /// `None` when no wallet is connected
    pub owner: Option<Pubkey>,
    pub namespaces: Vec<ProgramNamespace>,
    pub partial_policy: PartialFailurePolicy,
    pub output: OutputFormat,
    pub refresh_interval_ms: u64,
    pub mint_width: usize,
}

impl Config {
    /// Load configuration: defaults, then the TOML file, then the
    /// environment (including `.env`), then command-line flags
    pub fn load(cli: &Cli) -> Result<Self> {
        // Load .env file if it exists
        let _ = dotenv::dotenv();

        let file = match &cli.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                FileConfig::parse(&contents)?
            }
            None => FileConfig::default(),
        };

        Self::resolve(file, |key| env::var(key).ok(), cli)
    }

    /// Merge the layers; later layers win
    pub fn resolve(
        file: FileConfig,
        env: impl Fn(&str) -> Option<String>,
        cli: &Cli,
    ) -> Result<Self> {
        let pick = |flag: &Option<String>, key: &str, from_file: Option<String>| {
            flag.clone().or_else(|| env(key)).or(from_file)
        };

        let cluster = match pick(&cli.cluster, "CLUSTER", file.cluster) {
            Some(name) => name.parse()?,
            None => Cluster::default(),
        };

        let rpc_endpoint = pick(&cli.rpc_url, "RPC_ENDPOINT", file.rpc_url)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| cluster.url().to_string());

        let commitment = match pick(&cli.commitment, "COMMITMENT", file.commitment) {
            Some(level) => parse_commitment(&level)?,
            None => CommitmentConfig::confirmed(),
        };

        let owner = match pick(&cli.owner, "OWNER", file.owner) {
            Some(owner) => Some(parse_pubkey(&owner, "owner")?),
            None => match pick(&cli.keypair, "SECRET_PATH", file.keypair) {
                Some(path) => Some(
                    read_keypair_file(&path)
                        .map_err(|e| anyhow!("Failed to read keypair from {}: {}", path, e))?
                        .pubkey(),
                ),
                None => None,
            },
        };

        let namespaces = match pick(
            &cli.namespaces,
            "NAMESPACES",
            file.namespaces.map(|list| list.join(",")),
        ) {
            Some(list) => ProgramNamespace::parse_list(&list)?,
            None => ProgramNamespace::ALL.to_vec(),
        };

        let allow_partial = if cli.allow_partial {
            true
        } else {
            match env("ALLOW_PARTIAL") {
                Some(value) => parse_bool(&value)?,
                None => file.allow_partial.unwrap_or(false),
            }
        };
        let partial_policy = if allow_partial {
            PartialFailurePolicy::Continue
        } else {
            PartialFailurePolicy::Abort
        };

        let output = if cli.json {
            OutputFormat::Json
        } else {
            file.output.unwrap_or_default()
        };

        let refresh_interval_ms = match cli.interval_ms {
            Some(ms) => ms,
            None => match env("REFRESH_INTERVAL") {
                Some(value) => value.trim().parse::<u64>().map_err(|e| {
                    anyhow!("Invalid REFRESH_INTERVAL '{}': {}", value, e)
                })?,
                None => file.interval_ms.unwrap_or(0),
            },
        };

        let mint_width = cli
            .mint_width
            .or(file.mint_width)
            .unwrap_or(DEFAULT_MINT_WIDTH);

        Ok(Config {
            cluster,
            rpc_endpoint,
            commitment,
            owner,
            namespaces,
            partial_policy,
            output,
            refresh_interval_ms,
            mint_width,
        })
    }
}

fn parse_commitment(level: &str) -> Result<CommitmentConfig> {
    match level.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(anyhow!(
            "Unrecognized commitment: {}. Must be processed, confirmed, or finalized",
            other
        )),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("Expected a boolean, got '{}'", other)),
    }
}
