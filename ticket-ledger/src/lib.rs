//! Ticket Ledger Core
//!
//! Append-only, hash-chained ledger for event-ticket purchases.
//!
//! # Architecture
//!
//! - **Hash chaining**: every block stores the SHA-256 digest of its predecessor
//! - **Single writer**: one actor task owns the chain, eliminating commit races
//! - **Canonical hashing**: sorted-key JSON, so digests survive field reordering
//! - **Proof-of-work gate**: optional bounded mining step before commits
//!
//! # Invariants
//!
//! - Append-only: committed blocks are never modified or retracted
//! - Sealed snapshot: a block owns a copy of the pending buffer, not an alias
//! - Index-after-commit: tickets become verifiable only once their block is sealed
//! - Seat uniqueness: a (subject, seat) pair is claimed by at most one ticket,
//!   across committed blocks and the pending window alike

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod actor;
pub mod config;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod pow;
pub mod types;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use config::{Config, PowConfig};
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use types::{
    Block, BlockHash, CardDetails, ChainSnapshot, PaymentInfo, SeatKey, TicketId, TicketRequest,
    TicketSubject, Transaction, VerificationResult,
};
