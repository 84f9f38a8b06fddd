//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Hash linkage: the chain stays valid after any submit/commit sequence
//! - Index-after-commit: tickets verify only once their block is sealed
//! - Order preservation: blocks seal transactions in submission order
//! - Uniqueness: ticket ids never collide, seats are claimed at most once

use proptest::prelude::*;
use rust_decimal::Decimal;
use ticket_ledger::{
    pow::PLACEHOLDER_PROOF, Config, Error, Ledger, Metrics, PaymentInfo, TicketRequest,
    TicketSubject,
};

/// Strategy for generating buyer names
fn buyer_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,9}"
}

/// Strategy for generating ticket subjects (both variants)
fn subject_strategy() -> impl Strategy<Value = TicketSubject> {
    prop_oneof![
        "[A-Z][a-z]{3,12}( Night| Live|!)?".prop_map(|name| TicketSubject::Event { name }),
        ("[A-Z][a-z]{3,12}", "(18|19|20|21):(00|30)").prop_map(|(movie, showtime)| {
            TicketSubject::Screening { movie, showtime }
        }),
    ]
}

/// Strategy for generating prices (non-negative decimals, 2 places)
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0u64..1_000_00u64).prop_map(|cents| Decimal::new(cents as i64, 2))
}

/// Strategy for generating general-admission requests (no seat, so any
/// combination can be buffered without conflicts)
fn request_strategy() -> impl Strategy<Value = TicketRequest> {
    (buyer_strategy(), subject_strategy(), price_strategy(), 1u32..6).prop_map(
        |(buyer_name, subject, price, quantity)| TicketRequest {
            buyer_name,
            buyer_email: None,
            subject,
            seat: None,
            quantity,
            price,
            payment: PaymentInfo::cash(),
        },
    )
}

fn seated_request(buyer: &str, event: &str, seat: &str) -> TicketRequest {
    TicketRequest {
        buyer_name: buyer.to_string(),
        buyer_email: None,
        subject: TicketSubject::Event {
            name: event.to_string(),
        },
        seat: Some(seat.to_string()),
        quantity: 1,
        price: Decimal::new(99900, 2),
        payment: PaymentInfo::cash(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the chain stays valid after any submit/commit sequence
    #[test]
    fn prop_chain_valid_after_any_sequence(batches in prop::collection::vec(
        prop::collection::vec(request_strategy(), 0..5), 1..6
    )) {
        let mut ledger = Ledger::with_defaults();
        let batch_count = batches.len() as u64;

        for batch in batches {
            for request in batch {
                ledger.submit(request).unwrap();
            }
            ledger.commit(PLACEHOLDER_PROOF).unwrap();
        }

        prop_assert!(ledger.is_chain_valid());
        prop_assert_eq!(ledger.first_invalid_link().unwrap(), None);
        prop_assert_eq!(ledger.chain_length(), batch_count + 1);
        prop_assert_eq!(ledger.pending_count(), 0);
    }

    /// Property: every committed ticket verifies against the block that
    /// sealed it, and the result carries the matching record
    #[test]
    fn prop_committed_tickets_verifiable(requests in prop::collection::vec(request_strategy(), 1..10)) {
        let mut ledger = Ledger::with_defaults();

        let mut ticket_ids = Vec::new();
        for request in requests {
            ticket_ids.push(ledger.submit(request).unwrap());
        }
        ledger.commit(PLACEHOLDER_PROOF).unwrap();
        let sealed_at = ledger.chain_length();

        for ticket_id in &ticket_ids {
            let result = ledger.verify_ticket(ticket_id).unwrap();
            prop_assert!(result.valid);
            prop_assert_eq!(result.block_index, sealed_at);
            prop_assert_eq!(&result.transaction.ticket_id, ticket_id);
        }
    }

    /// Property: pending tickets are never verifiable
    #[test]
    fn prop_pending_not_verifiable(requests in prop::collection::vec(request_strategy(), 1..10)) {
        let mut ledger = Ledger::with_defaults();

        for request in requests {
            let ticket_id = ledger.submit(request).unwrap();
            prop_assert!(matches!(
                ledger.verify_ticket(&ticket_id),
                Err(Error::TicketNotFound(_))
            ));
        }
    }

    /// Property: ticket ids never collide, even for identical purchases
    #[test]
    fn prop_ticket_ids_unique(request in request_strategy(), copies in 2usize..20) {
        let mut ledger = Ledger::with_defaults();

        let mut ids = std::collections::HashSet::new();
        for _ in 0..copies {
            let ticket_id = ledger.submit(request.clone()).unwrap();
            prop_assert!(ids.insert(ticket_id));
        }
    }

    /// Property: a sealed block lists transactions in submission order
    #[test]
    fn prop_block_preserves_submission_order(requests in prop::collection::vec(request_strategy(), 1..10)) {
        let mut ledger = Ledger::with_defaults();

        let mut ticket_ids = Vec::new();
        for request in requests {
            ticket_ids.push(ledger.submit(request).unwrap());
        }

        let block = ledger.commit(PLACEHOLDER_PROOF).unwrap();
        let sealed: Vec<_> = block
            .transactions
            .iter()
            .map(|transaction| transaction.ticket_id.clone())
            .collect();
        prop_assert_eq!(sealed, ticket_ids);
    }

    /// Property: once a set of distinct seats is claimed, every repeat claim
    /// fails with a conflict, before and after the commit
    #[test]
    fn prop_seats_claimed_at_most_once(seat_count in 1usize..8) {
        let mut ledger = Ledger::with_defaults();
        let seats: Vec<String> = (0..seat_count).map(|i| format!("A{}", i)).collect();

        for seat in &seats {
            ledger.submit(seated_request("Alice", "Carnival", seat)).unwrap();
        }

        // Repeat claims in the same pending window
        for seat in &seats {
            let result = ledger.submit(seated_request("Bob", "Carnival", seat));
            prop_assert!(matches!(result, Err(Error::SeatConflict { .. })), "expected SeatConflict");
        }

        ledger.commit(PLACEHOLDER_PROOF).unwrap();

        // Repeat claims against the committed index
        for seat in &seats {
            let result = ledger.submit(seated_request("Carol", "Carnival", seat));
            prop_assert!(matches!(result, Err(Error::SeatConflict { .. })), "expected SeatConflict");
        }
    }
}

mod integration_tests {
    use super::*;
    use ticket_ledger::spawn_ledger_actor;

    fn actor_config(pow_enabled: bool) -> Config {
        let mut config = Config::default();
        config.pow.enabled = pow_enabled;
        config.pow.difficulty = 1;
        config.pow.max_iterations = 1_000_000;
        config
    }

    #[tokio::test]
    async fn test_full_purchase_lifecycle() {
        let handle = spawn_ledger_actor(actor_config(true), Metrics::default());

        let alice = handle
            .submit(seated_request("Alice", "Coldplay Live - 2024-05-01", "A1"))
            .await
            .unwrap();
        let bob = handle
            .submit(seated_request("Bob", "Coldplay Live - 2024-05-01", "A2"))
            .await
            .unwrap();

        let block = handle.commit().await.unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 2);

        let result = handle.verify_ticket(alice.clone()).await.unwrap();
        assert!(result.valid);
        assert_eq!(result.block_index, 2);
        assert_eq!(result.transaction.seat.as_deref(), Some("A1"));

        let result = handle.verify_ticket(bob).await.unwrap();
        assert_eq!(result.transaction.buyer_name, "Bob");

        // A second mined block keeps the chain linked
        handle
            .submit(seated_request("Carol", "Coldplay Live - 2024-05-01", "B1"))
            .await
            .unwrap();
        let block = handle.commit().await.unwrap();
        assert_eq!(block.index, 3);
        assert!(handle.is_chain_valid().await.unwrap());

        let snapshot = handle.chain().await.unwrap();
        assert_eq!(snapshot.length, 3);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_double_booking_across_commits() {
        let handle = spawn_ledger_actor(actor_config(false), Metrics::default());

        handle
            .submit(seated_request("Alice", "Dandiya Night", "C3"))
            .await
            .unwrap();
        handle.commit().await.unwrap();

        let result = handle
            .submit(seated_request("Bob", "dandiya night", "c3"))
            .await;
        assert!(matches!(result, Err(Error::SeatConflict { .. })));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_masked_payment_survives_the_chain() {
        use ticket_ledger::CardDetails;

        let handle = spawn_ledger_actor(actor_config(false), Metrics::default());

        let card = CardDetails {
            number: "4111 1111 1111 1234".to_string(),
            cvv: "007".to_string(),
        };
        let mut request = seated_request("Alice", "Painting", "D4");
        request.payment = PaymentInfo::from_card(&card);

        let ticket_id = handle.submit(request).await.unwrap();
        handle.commit().await.unwrap();

        let result = handle.verify_ticket(ticket_id).await.unwrap();
        assert_eq!(result.transaction.payment.method, "card");
        assert_eq!(result.transaction.payment.card_last4.as_deref(), Some("1234"));

        // The auditable chain view carries the same masked record; the full
        // PAN and the CVV were never stored anywhere to begin with
        let snapshot = handle.chain().await.unwrap();
        let sealed = &snapshot.blocks[1].transactions[0];
        assert_eq!(sealed.payment.card_last4.as_deref(), Some("1234"));
        let rendered = serde_json::to_string(&sealed.payment).unwrap();
        assert_eq!(rendered, r#"{"method":"card","card_last4":"1234"}"#);

        handle.shutdown().await.unwrap();
    }
}
