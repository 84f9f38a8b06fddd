//! Error types for the ticket ledger

use crate::types::TicketId;
use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Seat already claimed by a committed or pending purchase
    #[error("Seat {seat} is already taken for {subject}")]
    SeatConflict {
        /// Display form of the subject whose seat was contested
        subject: String,
        /// The contested seat label
        seat: String,
    },

    /// Ticket identifier absent from the index
    #[error("Ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// Index points at a block that does not contain the expected ticket
    #[error("Internal consistency failure: {0}")]
    InternalConsistency(String),

    /// Proof-of-work search hit its iteration bound
    #[error("Proof search exhausted after {iterations} iterations")]
    ProofSearchExhausted {
        /// Number of candidates tried before giving up
        iterations: u64,
    },

    /// Purchase rejected at construction time
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
