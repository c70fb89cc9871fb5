use log::info;
use std::time::Instant;

use crate::models::ProgramNamespace;

/// Timing and counts for one fetch-and-aggregate cycle
#[derive(Debug, Clone)]
pub struct CycleMetrics {
    pub cycle_start: Instant,
    pub fetch_ms: u64,
    pub aggregate_ms: u64,
    pub accounts_per_namespace: Vec<(ProgramNamespace, usize)>,
    pub records_accepted: usize,
    pub records_rejected: usize,
    pub distinct_mints: usize,
}

impl Default for CycleMetrics {
    fn default() -> Self {
        Self {
            cycle_start: Instant::now(),
            fetch_ms: 0,
            aggregate_ms: 0,
            accounts_per_namespace: Vec::new(),
            records_accepted: 0,
            records_rejected: 0,
            distinct_mints: 0,
        }
    }
}

impl CycleMetrics {
    pub fn start_cycle() -> Self {
        Self::default()
    }

    pub fn total_accounts(&self) -> usize {
        self.accounts_per_namespace.iter().map(|(_, n)| n).sum()
    }

    pub fn log_summary(&self) {
        let total_ms = self.cycle_start.elapsed().as_millis();
        info!("Cycle Summary:");
        info!("  Account Fetch:  {} ms", self.fetch_ms);
        info!("  Aggregation:    {} ms", self.aggregate_ms);
        info!("  Total Time:     {} ms", total_ms);
        for (namespace, count) in &self.accounts_per_namespace {
            info!("  {:<14}  {} accounts", namespace.label(), count);
        }
        info!(
            "  Stats: {} records, {} rejected, {} mints",
            self.records_accepted, self.records_rejected, self.distinct_mints
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_accounts() {
        let metrics = CycleMetrics {
            accounts_per_namespace: vec![(ProgramNamespace::Token, 3), (ProgramNamespace::Token2022, 2)],
            ..CycleMetrics::start_cycle()
        };
        assert_eq!(metrics.total_accounts(), 5);
        assert_eq!(CycleMetrics::default().total_accounts(), 0);
    }
}
