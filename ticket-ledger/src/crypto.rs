//! Hashing for blocks and ticket identifiers
//!
//! This module provides:
//! - SHA-256 hashing over a canonical block serialization
//! - Content-derived ticket identifiers with a uniqueness salt
//!
//! Blocks are hashed over their sorted-key JSON form (serde_json maps are
//! ordered by key), so the digest does not depend on struct field order and
//! stays portable across implementations.

use crate::types::{Block, BlockHash, TicketId, TicketSubject};
use crate::Result;
use sha2::{Digest, Sha256};

/// Hash arbitrary bytes using SHA-256
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Canonical JSON bytes of a block (keys sorted, no insignificant whitespace)
pub fn canonical_block_bytes(block: &Block) -> Result<Vec<u8>> {
    let value = serde_json::to_value(block)?;
    Ok(serde_json::to_vec(&value)?)
}

/// Hash a block over its canonical serialization
pub fn hash_block(block: &Block) -> Result<BlockHash> {
    Ok(hash_bytes(&canonical_block_bytes(block)?))
}

/// Derive a ticket identifier from purchase content plus a uniqueness salt
///
/// The timestamp and random salt keep two otherwise identical purchases
/// from colliding. Must be called before the purchase enters the pending
/// buffer, so the id can be handed back to the caller immediately.
pub fn derive_ticket_id(
    buyer_name: &str,
    subject: &TicketSubject,
    seat: Option<&str>,
    timestamp_nanos: i64,
    salt: u64,
) -> TicketId {
    let mut hasher = Sha256::new();
    hasher.update(buyer_name.as_bytes());
    hasher.update(subject.key().as_bytes());
    if let Some(seat) = seat {
        hasher.update(seat.as_bytes());
    }
    hasher.update(timestamp_nanos.to_be_bytes());
    hasher.update(salt.to_be_bytes());
    let digest: [u8; 32] = hasher.finalize().into();

    TicketId::new(hex::encode(&digest[..8]))
}
