//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ticket_ledger_tickets_submitted_total` - Tickets accepted into the pending buffer
//! - `ticket_ledger_seat_conflicts_total` - Purchases rejected for a claimed seat
//! - `ticket_ledger_blocks_committed_total` - Blocks sealed onto the chain
//! - `ticket_ledger_block_size` - Histogram of transactions per block
//! - `ticket_ledger_proof_search_duration_seconds` - Histogram of proof-of-work latencies
//! - `ticket_ledger_chain_length` - Committed blocks, including genesis
//!
//! Collectors register against a per-instance registry so several ledgers
//! (or tests) can coexist in one process.

use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Tickets accepted into the pending buffer
    pub tickets_submitted: IntCounter,

    /// Purchases rejected because the seat was already claimed
    pub seat_conflicts: IntCounter,

    /// Blocks sealed onto the chain
    pub blocks_committed: IntCounter,

    /// Transactions per sealed block
    pub block_size: Histogram,

    /// Proof-of-work search latency
    pub proof_search_duration: Histogram,

    /// Committed blocks, including genesis
    pub chain_length: IntGauge,

    /// Prometheus registry
    registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let tickets_submitted = IntCounter::new(
            "ticket_ledger_tickets_submitted_total",
            "Tickets accepted into the pending buffer",
        )?;
        registry.register(Box::new(tickets_submitted.clone()))?;

        let seat_conflicts = IntCounter::new(
            "ticket_ledger_seat_conflicts_total",
            "Purchases rejected because the seat was already claimed",
        )?;
        registry.register(Box::new(seat_conflicts.clone()))?;

        let blocks_committed = IntCounter::new(
            "ticket_ledger_blocks_committed_total",
            "Blocks sealed onto the chain",
        )?;
        registry.register(Box::new(blocks_committed.clone()))?;

        let block_size = Histogram::with_opts(
            HistogramOpts::new("ticket_ledger_block_size", "Transactions per sealed block")
                .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        )?;
        registry.register(Box::new(block_size.clone()))?;

        let proof_search_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ticket_ledger_proof_search_duration_seconds",
                "Histogram of proof-of-work search latencies",
            )
            .buckets(vec![0.001, 0.005, 0.010, 0.050, 0.100, 0.500, 1.0, 5.0]),
        )?;
        registry.register(Box::new(proof_search_duration.clone()))?;

        let chain_length = IntGauge::new(
            "ticket_ledger_chain_length",
            "Committed blocks, including genesis",
        )?;
        registry.register(Box::new(chain_length.clone()))?;

        Ok(Self {
            tickets_submitted,
            seat_conflicts,
            blocks_committed,
            block_size,
            proof_search_duration,
            chain_length,
            registry,
        })
    }

    /// Record an accepted ticket submission
    pub fn record_ticket_submitted(&self) {
        self.tickets_submitted.inc();
    }

    /// Record a rejected double-booking attempt
    pub fn record_seat_conflict(&self) {
        self.seat_conflicts.inc();
    }

    /// Record a sealed block and its transaction count
    pub fn record_block_committed(&self, transaction_count: usize) {
        self.blocks_committed.inc();
        self.block_size.observe(transaction_count as f64);
    }

    /// Record a proof-of-work search latency
    pub fn record_proof_search(&self, duration_seconds: f64) {
        self.proof_search_duration.observe(duration_seconds);
    }

    /// Update the committed chain length
    pub fn set_chain_length(&self, length: i64) {
        self.chain_length.set(length);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("collector registration on a fresh registry cannot collide")
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("tickets_submitted", &self.tickets_submitted.get())
            .field("seat_conflicts", &self.seat_conflicts.get())
            .field("blocks_committed", &self.blocks_committed.get())
            .field("chain_length", &self.chain_length.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.tickets_submitted.get(), 0);
        assert_eq!(metrics.blocks_committed.get(), 0);
    }

    #[test]
    fn test_instances_are_independent() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();

        a.record_ticket_submitted();
        assert_eq!(a.tickets_submitted.get(), 1);
        assert_eq!(b.tickets_submitted.get(), 0);
    }

    #[test]
    fn test_record_block_committed() {
        let metrics = Metrics::new().unwrap();
        metrics.record_block_committed(3);
        metrics.record_block_committed(10);
        assert_eq!(metrics.blocks_committed.get(), 2);
    }

    #[test]
    fn test_set_chain_length() {
        let metrics = Metrics::new().unwrap();
        metrics.set_chain_length(4);
        assert_eq!(metrics.chain_length.get(), 4);
    }

    #[test]
    fn test_registry_gathers_all_collectors() {
        let metrics = Metrics::new().unwrap();
        metrics.record_ticket_submitted();
        let families = metrics.registry().gather();
        assert_eq!(families.len(), 6);
    }
}
