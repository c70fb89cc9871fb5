pub mod balance;
pub mod namespace;
pub mod record;

pub use balance::AggregatedBalance;
pub use namespace::ProgramNamespace;
pub use record::TokenAccountRecord;
