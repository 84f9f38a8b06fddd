//! Core types for the ticket ledger
//!
//! All types are designed for:
//! - Canonical serialization (sorted-key JSON for hashing)
//! - Immutability once sealed into a block
//! - Exact arithmetic (Decimal for prices)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA-256 digest of a block
pub type BlockHash = [u8; 32];

/// Previous-hash sentinel carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: BlockHash = [0u8; 32];

/// Proof value carried by the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// Ticket identifier (content-derived lowercase hex)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(String);

impl TicketId {
    /// Create a ticket ID from its string form
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a ticket admits to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TicketSubject {
    /// A named event (concert, carnival, ...)
    Event {
        /// Event name as entered by the organizer
        name: String,
    },
    /// A movie screening at a specific showtime
    Screening {
        /// Movie title
        movie: String,
        /// Showtime label (e.g. "2024-05-01 19:30")
        showtime: String,
    },
}

impl TicketSubject {
    /// Case-insensitive identity used for seat-conflict detection
    pub fn key(&self) -> String {
        match self {
            TicketSubject::Event { name } => name.trim().to_lowercase(),
            TicketSubject::Screening { movie, showtime } => {
                format!(
                    "{}@{}",
                    movie.trim().to_lowercase(),
                    showtime.trim().to_lowercase()
                )
            }
        }
    }
}

impl fmt::Display for TicketSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketSubject::Event { name } => write!(f, "{}", name),
            TicketSubject::Screening { movie, showtime } => {
                write!(f, "{} ({})", movie, showtime)
            }
        }
    }
}

/// Case-insensitive (subject, seat) composite used to reject double-booking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatKey(String);

impl SeatKey {
    /// Build the key from a subject and a seat label
    pub fn new(subject: &TicketSubject, seat: &str) -> Self {
        Self(format!("{}|{}", subject.key(), seat.trim().to_lowercase()))
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Raw card input collected by the booking flow
///
/// Never stored; masked into [`PaymentInfo`] before a transaction is built.
/// The full number and the CVV are redacted from `Debug` output.
#[derive(Clone)]
pub struct CardDetails {
    /// Full card number (PAN)
    pub number: String,
    /// Card verification value
    pub cvv: String,
}

impl CardDetails {
    /// Last 4 digits of the card number, if it has that many
    pub fn last4(&self) -> Option<String> {
        let digits: Vec<char> = self.number.chars().filter(char::is_ascii_digit).collect();
        if digits.len() >= 4 {
            Some(digits[digits.len() - 4..].iter().collect())
        } else {
            None
        }
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &"****")
            .field("cvv", &"***")
            .finish()
    }
}

/// Payment metadata retained in the ledger (display-safe)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInfo {
    /// Payment method label
    pub method: String,

    /// Last 4 digits of the card number, when paid by card
    pub card_last4: Option<String>,
}

impl PaymentInfo {
    /// Cash payment, no card metadata
    pub fn cash() -> Self {
        Self {
            method: "cash".to_string(),
            card_last4: None,
        }
    }

    /// Card payment; retains only the last 4 digits
    pub fn from_card(card: &CardDetails) -> Self {
        Self {
            method: "card".to_string(),
            card_last4: card.last4(),
        }
    }
}

/// A ticket purchase awaiting submission
#[derive(Debug, Clone)]
pub struct TicketRequest {
    /// Buyer's name
    pub buyer_name: String,

    /// Buyer's email, if provided
    pub buyer_email: Option<String>,

    /// What the ticket admits to
    pub subject: TicketSubject,

    /// Seat label for reserved seating, `None` for general admission
    pub seat: Option<String>,

    /// Number of admissions
    pub quantity: u32,

    /// Total price (exact decimal)
    pub price: Decimal,

    /// Masked payment metadata
    pub payment: PaymentInfo,
}

/// A sealed ticket purchase record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique content-derived ticket identifier
    pub ticket_id: TicketId,

    /// Buyer's name
    pub buyer_name: String,

    /// Buyer's email, if provided
    pub buyer_email: Option<String>,

    /// What the ticket admits to
    pub subject: TicketSubject,

    /// Seat label, `None` for general admission
    pub seat: Option<String>,

    /// Number of admissions
    pub quantity: u32,

    /// Total price (exact decimal)
    pub price: Decimal,

    /// Masked payment metadata
    pub payment: PaymentInfo,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Seat-conflict key, when this purchase claims a seat
    pub fn seat_key(&self) -> Option<SeatKey> {
        self.seat
            .as_deref()
            .map(|seat| SeatKey::new(&self.subject, seat))
    }
}

/// A committed block in the hash chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Sequence index (1-based, genesis is 1)
    pub index: u64,

    /// Block creation timestamp
    pub timestamp: DateTime<Utc>,

    /// Transactions sealed at commit time, in submission order
    pub transactions: Vec<Transaction>,

    /// Proof value accepted by the commit
    pub proof: u64,

    /// Hash of the preceding block ([`GENESIS_PREVIOUS_HASH`] for block 1)
    pub previous_hash: BlockHash,
}

impl Block {
    /// Hex form of the stored previous-hash, for display
    pub fn previous_hash_hex(&self) -> String {
        hex::encode(self.previous_hash)
    }

    /// Whether this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.index == 1 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

/// Outcome of a successful ticket verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Always true for a returned result; failures surface as errors
    pub valid: bool,

    /// Index of the block containing the ticket
    pub block_index: u64,

    /// Recomputed hash of that block
    pub block_hash: BlockHash,

    /// Timestamp of that block
    pub block_timestamp: DateTime<Utc>,

    /// The matching purchase record
    pub transaction: Transaction,
}

/// Read-only view of the committed chain, for display and audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    /// Number of committed blocks, including genesis
    pub length: u64,

    /// The blocks, genesis first
    pub blocks: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_key_case_insensitive() {
        let a = TicketSubject::Event {
            name: "Coldplay Live".to_string(),
        };
        let b = TicketSubject::Event {
            name: "  COLDPLAY LIVE ".to_string(),
        };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_screening_key_includes_showtime() {
        let early = TicketSubject::Screening {
            movie: "Dune".to_string(),
            showtime: "18:00".to_string(),
        };
        let late = TicketSubject::Screening {
            movie: "Dune".to_string(),
            showtime: "21:00".to_string(),
        };
        assert_ne!(early.key(), late.key());
    }

    #[test]
    fn test_seat_key_normalization() {
        let subject = TicketSubject::Event {
            name: "Carnival".to_string(),
        };
        assert_eq!(
            SeatKey::new(&subject, "A1"),
            SeatKey::new(&subject, " a1 ")
        );
        assert_ne!(SeatKey::new(&subject, "A1"), SeatKey::new(&subject, "A2"));
    }

    #[test]
    fn test_card_masking_keeps_last4_only() {
        let card = CardDetails {
            number: "4111 1111 1111 1234".to_string(),
            cvv: "999".to_string(),
        };
        let payment = PaymentInfo::from_card(&card);
        assert_eq!(payment.card_last4.as_deref(), Some("1234"));

        let serialized = serde_json::to_string(&payment).unwrap();
        assert!(!serialized.contains("4111"));
        assert!(!serialized.contains("999"));
    }

    #[test]
    fn test_card_debug_is_redacted() {
        let card = CardDetails {
            number: "4111111111111234".to_string(),
            cvv: "999".to_string(),
        };
        let debug = format!("{:?}", card);
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("999"));
    }

    #[test]
    fn test_short_card_number_has_no_last4() {
        let card = CardDetails {
            number: "12".to_string(),
            cvv: "000".to_string(),
        };
        assert_eq!(card.last4(), None);
    }

    #[test]
    fn test_genesis_detection() {
        let genesis = Block {
            index: 1,
            timestamp: Utc::now(),
            transactions: vec![],
            proof: GENESIS_PROOF,
            previous_hash: GENESIS_PREVIOUS_HASH,
        };
        assert!(genesis.is_genesis());

        let child = Block {
            index: 2,
            previous_hash: [7u8; 32],
            ..genesis.clone()
        };
        assert!(!child.is_genesis());
    }
}
