//! Actor-based concurrency for the ticket ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the ledger, so the seat-check-then-append intake and the
//!   read-hash/build/append/index commit sequence never interleave
//! - Proof-of-work searches run on the blocking pool, off the async runtime
//! - Async message passing with backpressure (bounded mailbox)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │            Booking wizard / UI layer                  │
//! │        (renders receipts, QR codes, PDFs)             │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │   Ledger { chain, pending, indices }                  │
//! │   Commit: find_proof() on spawn_blocking, then seal   │
//! └──────────────────────────────────────────────────────┘
//! ```

use crate::types::{Block, ChainSnapshot, TicketId, TicketRequest, VerificationResult};
use crate::{pow, Config, Error, Ledger, Metrics, Result};
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Buffer a ticket purchase
    Submit {
        /// The purchase to buffer
        request: TicketRequest,
        /// Channel carrying the assigned ticket id back to the caller
        response: oneshot::Sender<Result<TicketId>>,
    },

    /// Seal the pending buffer into a new block
    Commit {
        /// Channel carrying the sealed block back to the caller
        response: oneshot::Sender<Result<Block>>,
    },

    /// Verify a committed ticket
    VerifyTicket {
        /// The ticket to look up
        ticket_id: TicketId,
        /// Channel carrying the verification result back to the caller
        response: oneshot::Sender<Result<VerificationResult>>,
    },

    /// Get a read-only chain snapshot
    GetChain {
        /// Channel carrying the snapshot back to the caller
        response: oneshot::Sender<ChainSnapshot>,
    },

    /// Check hash linkage across the committed chain
    IsChainValid {
        /// Channel carrying the verdict back to the caller
        response: oneshot::Sender<bool>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
pub struct LedgerActor {
    /// The single-writer ledger
    ledger: Ledger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Metrics collector
    metrics: Metrics,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Ledger, mailbox: mpsc::Receiver<LedgerMessage>, metrics: Metrics) -> Self {
        Self {
            ledger,
            mailbox,
            metrics,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        self.metrics.set_chain_length(self.ledger.chain_length() as i64);

        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown => break,
                msg => self.handle_message(msg).await,
            }
        }
    }

    /// Handle a single message
    async fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::Submit { request, response } => {
                let result = self.ledger.submit(request);
                match &result {
                    Ok(_) => self.metrics.record_ticket_submitted(),
                    Err(Error::SeatConflict { .. }) => self.metrics.record_seat_conflict(),
                    Err(_) => {}
                }
                let _ = response.send(result);
            }

            LedgerMessage::Commit { response } => {
                let result = self.commit().await;
                let _ = response.send(result);
            }

            LedgerMessage::VerifyTicket {
                ticket_id,
                response,
            } => {
                let result = self.ledger.verify_ticket(&ticket_id);
                let _ = response.send(result);
            }

            LedgerMessage::GetChain { response } => {
                let _ = response.send(self.ledger.chain());
            }

            LedgerMessage::IsChainValid { response } => {
                let _ = response.send(self.ledger.is_chain_valid());
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    /// Obtain a proof (mining on the blocking pool when the gate is enabled)
    /// and seal the pending buffer
    async fn commit(&mut self) -> Result<Block> {
        let proof = if self.ledger.config().pow.enabled {
            let last_proof = self.ledger.last_block().proof;
            let pow_config = self.ledger.config().pow.clone();
            let started = std::time::Instant::now();

            let proof = tokio::task::spawn_blocking(move || pow::find_proof(last_proof, &pow_config))
                .await
                .map_err(|e| Error::Concurrency(format!("Proof search task failed: {}", e)))??;

            self.metrics.record_proof_search(started.elapsed().as_secs_f64());
            proof
        } else {
            pow::PLACEHOLDER_PROOF
        };

        let block = self.ledger.commit(proof)?.clone();
        self.metrics.record_block_committed(block.transactions.len());
        self.metrics.set_chain_length(self.ledger.chain_length() as i64);

        Ok(block)
    }
}

/// Handle for sending messages to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    /// Buffer a ticket purchase, returning its id
    pub async fn submit(&self, request: TicketRequest) -> Result<TicketId> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::Submit {
                request,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Seal the pending buffer into a new block
    ///
    /// When proof-of-work is enabled the actor mines the proof itself, so the
    /// commit precondition holds by construction.
    pub async fn commit(&self) -> Result<Block> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::Commit { response: tx })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Verify a committed ticket
    pub async fn verify_ticket(&self, ticket_id: TicketId) -> Result<VerificationResult> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::VerifyTicket {
                ticket_id,
                response: tx,
            })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))?
    }

    /// Get a read-only chain snapshot
    pub async fn chain(&self) -> Result<ChainSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::GetChain { response: tx })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Check hash linkage across the committed chain
    pub async fn is_chain_valid(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(LedgerMessage::IsChainValid { response: tx })
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(config: Config, metrics: Metrics) -> LedgerHandle {
    let capacity = config.mailbox_capacity;
    let (tx, rx) = mpsc::channel(capacity);
    let actor = LedgerActor::new(Ledger::new(config), rx, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
