pub mod aggregate;
pub mod config;
pub mod display;
pub mod error;
pub mod metrics;
pub mod models;
pub mod portfolio;
pub mod rpc;
pub mod utils;

pub use aggregate::{aggregate, sort_by_mint};
pub use config::Config;
pub use models::{AggregatedBalance, ProgramNamespace, TokenAccountRecord};
