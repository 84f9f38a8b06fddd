//! Append-only hash-chained ticket ledger
//!
//! The ledger owns the committed chain, the pending buffer, and both
//! secondary indices. All mutation goes through `&mut self`, so a single
//! owner (in practice the actor in [`crate::actor`]) serializes the
//! check-then-append intake and the read-hash/build/append/index commit
//! sequence.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use ticket_ledger::{Config, Ledger, PaymentInfo, TicketRequest, TicketSubject};
//!
//! # fn main() -> ticket_ledger::Result<()> {
//! let mut ledger = Ledger::new(Config::default());
//!
//! let ticket_id = ledger.submit(TicketRequest {
//!     buyer_name: "Alice".to_string(),
//!     buyer_email: None,
//!     subject: TicketSubject::Event { name: "Coldplay Live".to_string() },
//!     seat: Some("A1".to_string()),
//!     quantity: 1,
//!     price: Decimal::new(99900, 2),
//!     payment: PaymentInfo::cash(),
//! })?;
//!
//! ledger.commit(ticket_ledger::pow::PLACEHOLDER_PROOF)?;
//! let result = ledger.verify_ticket(&ticket_id)?;
//! assert_eq!(result.block_index, 2);
//! # Ok(())
//! # }
//! ```

use crate::{
    crypto::{derive_ticket_id, hash_block},
    error::{Error, Result},
    types::{
        Block, ChainSnapshot, SeatKey, TicketId, TicketRequest, TicketSubject, Transaction,
        VerificationResult, GENESIS_PREVIOUS_HASH, GENESIS_PROOF,
    },
    Config,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The ticket ledger: committed chain, pending buffer, and indices
pub struct Ledger {
    /// Committed blocks, genesis first; never mutated after append
    chain: Vec<Block>,

    /// Purchases not yet sealed into a block
    pending: Vec<Transaction>,

    /// Ticket id to owning block index, committed tickets only
    ticket_index: HashMap<TicketId, u64>,

    /// Seat key to claiming ticket, committed tickets only
    seat_index: HashMap<SeatKey, TicketId>,

    /// Configuration
    config: Config,
}

impl Ledger {
    /// Create a ledger holding only the genesis block
    pub fn new(config: Config) -> Self {
        let genesis = Block {
            index: 1,
            timestamp: Utc::now(),
            transactions: Vec::new(),
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH,
        };

        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            ticket_index: HashMap::new(),
            seat_index: HashMap::new(),
            config,
        }
    }

    /// Create a ledger with default configuration
    pub fn with_defaults() -> Self {
        Self::new(Config::default())
    }

    /// Returns the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of committed blocks, including genesis
    pub fn chain_length(&self) -> u64 {
        self.chain.len() as u64
    }

    /// Number of purchases waiting for the next commit
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The most recently committed block
    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain always holds genesis")
    }

    /// Buffer a ticket purchase, returning its id
    ///
    /// The id is handed back immediately, but the ticket only becomes
    /// verifiable once a commit seals it into a block.
    ///
    /// # Errors
    /// - `InvalidTransaction` if required fields are missing or malformed
    /// - `SeatConflict` if the seat is claimed by a committed or pending purchase
    pub fn submit(&mut self, request: TicketRequest) -> Result<TicketId> {
        Self::validate_request(&request)?;

        if let Some(seat) = request.seat.as_deref() {
            self.check_seat_free(&request.subject, seat)?;
        }

        let created_at = Utc::now();
        let salt: u64 = rand::random();
        let ticket_id = derive_ticket_id(
            &request.buyer_name,
            &request.subject,
            request.seat.as_deref(),
            created_at.timestamp_nanos_opt().unwrap_or(0),
            salt,
        );

        let transaction = Transaction {
            ticket_id: ticket_id.clone(),
            buyer_name: request.buyer_name,
            buyer_email: request.buyer_email,
            subject: request.subject,
            seat: request.seat,
            quantity: request.quantity,
            price: request.price,
            payment: request.payment,
            created_at,
        };

        tracing::debug!(
            ticket_id = %ticket_id,
            pending = self.pending.len() + 1,
            "Ticket buffered"
        );
        self.pending.push(transaction);

        Ok(ticket_id)
    }

    /// Seal the pending buffer into a new block linked to the chain tip
    ///
    /// The block takes a snapshot of the buffer (taken by value, buffer reset
    /// to empty), never an alias, so later submissions cannot reach into a
    /// sealed block. Afterwards every sealed ticket is registered in the
    /// ticket index and, where a seat is claimed, the seat index.
    pub fn commit(&mut self, proof: u64) -> Result<&Block> {
        let previous_hash = hash_block(self.last_block())?;
        let transactions = std::mem::take(&mut self.pending);

        let block = Block {
            index: self.chain.len() as u64 + 1,
            timestamp: Utc::now(),
            transactions,
            proof,
            previous_hash,
        };

        for transaction in &block.transactions {
            self.ticket_index
                .insert(transaction.ticket_id.clone(), block.index);
            if let Some(key) = transaction.seat_key() {
                self.seat_index.insert(key, transaction.ticket_id.clone());
            }
        }

        tracing::info!(
            block_index = block.index,
            transaction_count = block.transactions.len(),
            previous_hash = %block.previous_hash_hex(),
            "Block committed"
        );
        self.chain.push(block);

        Ok(self.last_block())
    }

    /// Index of the first block whose stored previous-hash does not match
    /// the recomputed hash of its predecessor
    pub fn first_invalid_link(&self) -> Result<Option<u64>> {
        for pair in self.chain.windows(2) {
            let expected = hash_block(&pair[0])?;
            if pair[1].previous_hash != expected {
                tracing::warn!(
                    block_index = pair[1].index,
                    "Chain link mismatch: stored previous-hash differs from recomputed hash"
                );
                return Ok(Some(pair[1].index));
            }
        }

        Ok(None)
    }

    /// Whether every block links to the actual hash of its predecessor
    pub fn is_chain_valid(&self) -> bool {
        matches!(self.first_invalid_link(), Ok(None))
    }

    /// Look up a committed ticket and re-check it inside its block
    ///
    /// # Errors
    /// - `TicketNotFound` if the id was never committed (pending ids included)
    /// - `InternalConsistency` if the index points at a block that does not
    ///   actually contain the ticket
    pub fn verify_ticket(&self, ticket_id: &TicketId) -> Result<VerificationResult> {
        let block_index = *self
            .ticket_index
            .get(ticket_id)
            .ok_or_else(|| Error::TicketNotFound(ticket_id.clone()))?;

        let block = self
            .chain
            .get(block_index as usize - 1)
            .ok_or_else(|| {
                tracing::error!(
                    ticket_id = %ticket_id,
                    block_index,
                    "Ticket index points past the end of the chain"
                );
                Error::InternalConsistency(format!(
                    "ticket {} indexed at missing block {}",
                    ticket_id, block_index
                ))
            })?;

        // The index points at a block, not a transaction; re-scan the block
        // so a corrupted index surfaces as an error instead of a bogus result
        let transaction = block
            .transactions
            .iter()
            .find(|transaction| &transaction.ticket_id == ticket_id)
            .cloned()
            .ok_or_else(|| {
                tracing::error!(
                    ticket_id = %ticket_id,
                    block_index,
                    "Ticket index points at a block that does not contain the ticket"
                );
                Error::InternalConsistency(format!(
                    "block {} does not contain ticket {}",
                    block_index, ticket_id
                ))
            })?;

        Ok(VerificationResult {
            valid: true,
            block_index,
            block_hash: hash_block(block)?,
            block_timestamp: block.timestamp,
            transaction,
        })
    }

    /// Read-only snapshot of the committed chain, for display and audit
    pub fn chain(&self) -> ChainSnapshot {
        ChainSnapshot {
            length: self.chain.len() as u64,
            blocks: self.chain.clone(),
        }
    }

    /// The committed seat index and the pending buffer must both be free of
    /// the key: the committed index alone cannot see sibling pending
    /// purchases in the same uncommitted window.
    fn check_seat_free(&self, subject: &TicketSubject, seat: &str) -> Result<()> {
        let key = SeatKey::new(subject, seat);

        let pending_claim = self
            .pending
            .iter()
            .any(|transaction| transaction.seat_key().as_ref() == Some(&key));

        if pending_claim || self.seat_index.contains_key(&key) {
            return Err(Error::SeatConflict {
                subject: subject.to_string(),
                seat: seat.to_string(),
            });
        }

        Ok(())
    }

    /// Validate purchase fields at construction, not at access time
    fn validate_request(request: &TicketRequest) -> Result<()> {
        if request.buyer_name.trim().is_empty() {
            return Err(Error::InvalidTransaction(
                "buyer name must not be empty".to_string(),
            ));
        }

        if request.quantity == 0 {
            return Err(Error::InvalidTransaction(
                "quantity must be at least 1".to_string(),
            ));
        }

        if request.price < Decimal::ZERO {
            return Err(Error::InvalidTransaction(
                "price must not be negative".to_string(),
            ));
        }

        if let Some(seat) = &request.seat {
            if seat.trim().is_empty() {
                return Err(Error::InvalidTransaction(
                    "seat label must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
