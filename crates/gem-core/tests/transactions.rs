//! Submission lifecycle: signing, compute budget, and each failure path.

mod common;

use common::{Harness, MockLedger, MockWallet};
use gem_core::{Address, GemError, Opcode, PositionClass};
use gem_sol::{COMPUTE_BUDGET_PROGRAM_ID, SYSTEM_PROGRAM_ID};

const MINT: Address = Address::new([0x42; 32]);
const TARGET: Address = Address::new([0xA0; 32]);

#[tokio::test]
async fn mint_signs_with_payer_and_fresh_mint() {
    let h = Harness::new();
    let mint = h.client.mint(PositionClass::Emerald).await.unwrap();

    let submitted = h.ledger.submitted();
    assert_eq!(submitted.len(), 1);
    let tx = &submitted[0].1;

    assert_eq!(tx.message.signer_keys(), &[h.owner(), mint]);
    assert!(tx.is_signed_by(&h.owner()));
    assert!(tx.is_signed_by(&mint));
    assert_eq!(tx.message.recent_blockhash, [0xB7; 32]);
    assert!(tx.serialize().is_ok());

    let applied = h.ledger.applied();
    assert_eq!(applied[0].program_id, COMPUTE_BUDGET_PROGRAM_ID);
    assert_eq!(applied[0].data[1..], 240_000u32.to_le_bytes());
    assert_eq!(applied[1].data, vec![Opcode::MintPosition as u8, 3]);
    assert_eq!(applied[1].accounts[10], h.client.addresses().gem_account(&mint).unwrap());
}

#[tokio::test]
async fn plain_operations_skip_the_compute_budget() {
    let h = Harness::new();
    h.client.allocate(&MINT).await.unwrap();
    h.client.deallocate(&MINT).await.unwrap();
    h.client.delegate(&MINT, &TARGET).await.unwrap();
    h.client.undelegate(&MINT, &TARGET).await.unwrap();
    h.client.redeem(&MINT).await.unwrap();

    let opcodes: Vec<u8> = h.ledger.applied().iter().map(|ix| ix.data[0]).collect();
    assert_eq!(
        opcodes,
        vec![
            Opcode::AllocateValue as u8,
            Opcode::DeallocateValue as u8,
            Opcode::DelegateValue as u8,
            Opcode::UndelegateValue as u8,
            Opcode::Redeem as u8,
        ]
    );
    let delegate = &h.ledger.applied()[2];
    assert_eq!(delegate.accounts[2], TARGET);
    assert_eq!(delegate.accounts.last(), Some(&gem_sol::STAKE_PROGRAM_ID));
    let allocate = &h.ledger.applied()[0];
    assert_eq!(allocate.accounts.last(), Some(&SYSTEM_PROGRAM_ID));
}

#[tokio::test]
async fn disconnected_wallet_fails_without_submitting() {
    let ledger = MockLedger::new();
    let h = Harness::with_wallet(ledger.clone(), MockWallet::disconnected(ledger));

    let err = h.client.redeem(&MINT).await.unwrap_err();
    assert!(matches!(err.source, GemError::WalletNotConnected));
    assert_eq!(err.to_string(), "redeem failed: wallet not connected");
    assert!(h.ledger.submitted().is_empty());
}

#[tokio::test]
async fn declined_signature_is_surfaced() {
    let ledger = MockLedger::new();
    let h = Harness::with_wallet(ledger.clone(), MockWallet::rejecting(ledger));

    let err = h.client.delegate(&MINT, &TARGET).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "delegate failed: signature rejected: user declined"
    );
    assert!(h.ledger.submitted().is_empty());
}

#[tokio::test]
async fn recency_fetch_failure_is_surfaced() {
    let h = Harness::new();
    h.ledger.take_recency_offline();

    let err = h.client.allocate(&MINT).await.unwrap_err();
    assert!(matches!(err.source, GemError::TransportFailure(_)));
    assert_eq!(err.to_string(), "allocate failed: transport failure: rpc unreachable");
    assert!(h.ledger.submitted().is_empty());
    assert!(h.ledger.applied().is_empty());
    assert!(h.ledger.confirmed().is_empty());
}

#[tokio::test]
async fn dropped_submission_is_surfaced() {
    let h = Harness::new();
    h.ledger.drop_sends();

    let err = h.client.undelegate(&MINT, &TARGET).await.unwrap_err();
    assert!(matches!(err.source, GemError::TransportFailure(_)));
    assert_eq!(err.to_string(), "undelegate failed: transport failure: connection reset");
    assert!(h.ledger.applied().is_empty());
    assert!(h.ledger.confirmed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn confirmation_times_out() {
    let h = Harness::new();
    h.ledger.hang_confirmations();

    let err = h.client.allocate(&MINT).await.unwrap_err();
    assert!(matches!(err.source, GemError::ConfirmationTimeout(60)));
    assert_eq!(h.ledger.submitted().len(), 1);
}
