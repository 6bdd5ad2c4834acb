//! Build, sign, submit and confirm one atomic transaction.
//!
//! ```text
//! Building ──▶ AwaitingSignature ──▶ Submitted ──▶ Confirmed
//!    │                │                  │
//!    └────────────────┴──────────────────┴──▶ Failed
//! ```
//!
//! Every instruction handed to [`TransactionOrchestrator::submit`] lands in a
//! single transaction, so the ledger applies all of them or none. Nothing is
//! retried: a failure at any step fails the whole submission.

use std::sync::Arc;
use std::time::Duration;

use gem_sol::{
    compile_message, set_compute_unit_limit, Address, Instruction, Keypair, Signature,
    Transaction,
};
use tracing::{debug, info, warn};

use crate::error::GemError;
use crate::ledger::{LedgerReader, WalletCapability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TxState {
    Building,
    AwaitingSignature,
    Submitted,
    Confirmed,
    Failed,
}

impl TxState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TxState::Confirmed | TxState::Failed)
    }

    pub fn can_advance_to(self, next: TxState) -> bool {
        match (self, next) {
            (TxState::Building, TxState::AwaitingSignature)
            | (TxState::AwaitingSignature, TxState::Submitted)
            | (TxState::Submitted, TxState::Confirmed) => true,
            (from, TxState::Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

struct Lifecycle {
    state: TxState,
}

impl Lifecycle {
    fn new() -> Self {
        debug!(state = ?TxState::Building, "transaction lifecycle started");
        Self {
            state: TxState::Building,
        }
    }

    fn advance(&mut self, next: TxState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {next:?}",
            self.state
        );
        debug!(from = ?self.state, to = ?next, "transaction state");
        self.state = next;
    }

    fn fail(&mut self, err: &GemError) {
        warn!(state = ?self.state, error = %err, "transaction failed");
        self.state = TxState::Failed;
    }
}

pub struct TransactionOrchestrator {
    ledger: Arc<dyn LedgerReader>,
    wallet: Arc<dyn WalletCapability>,
    confirmation_timeout: Duration,
}

impl TransactionOrchestrator {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        wallet: Arc<dyn WalletCapability>,
        confirmation_timeout: Duration,
    ) -> Self {
        Self {
            ledger,
            wallet,
            confirmation_timeout,
        }
    }

    /// The connected wallet's key, which pays for every transaction.
    pub fn fee_payer(&self) -> Result<Address, GemError> {
        self.wallet.public_key().ok_or(GemError::WalletNotConnected)
    }

    /// Submit `instructions` as one transaction and wait for confirmation.
    ///
    /// With `compute_units` set, a compute budget directive is placed before
    /// the instructions. `extra_signers` sign locally before the wallet does.
    /// Returns the transaction id once the ledger confirms it.
    pub async fn submit(
        &self,
        instructions: Vec<Instruction>,
        fee_payer: Address,
        extra_signers: &[&Keypair],
        compute_units: Option<u32>,
    ) -> Result<Signature, GemError> {
        let mut lifecycle = Lifecycle::new();
        self.run(&mut lifecycle, instructions, fee_payer, extra_signers, compute_units)
            .await
    }

    async fn run(
        &self,
        lifecycle: &mut Lifecycle,
        instructions: Vec<Instruction>,
        fee_payer: Address,
        extra_signers: &[&Keypair],
        compute_units: Option<u32>,
    ) -> Result<Signature, GemError> {
        let result = self
            .drive(lifecycle, instructions, fee_payer, extra_signers, compute_units)
            .await;
        if let Err(err) = &result {
            lifecycle.fail(err);
        }
        result
    }

    async fn drive(
        &self,
        lifecycle: &mut Lifecycle,
        instructions: Vec<Instruction>,
        fee_payer: Address,
        extra_signers: &[&Keypair],
        compute_units: Option<u32>,
    ) -> Result<Signature, GemError> {
        let mut all = Vec::with_capacity(instructions.len() + 1);
        if let Some(units) = compute_units {
            all.push(set_compute_unit_limit(units));
        }
        all.extend(instructions);

        // Fetched as late as possible so the token is fresh at signing time.
        let recency_token = self.ledger.get_latest_recency_token().await?;
        let message = compile_message(&all, &fee_payer, &recency_token)?;

        let mut transaction = Transaction::new_unsigned(message);
        // Empty signature slots already take their full width on the wire.
        transaction.serialize()?;
        for signer in extra_signers {
            transaction.partial_sign(signer)?;
        }

        lifecycle.advance(TxState::AwaitingSignature);
        let signed = self.wallet.sign_transaction(transaction).await?;
        signed
            .verify_signatures()
            .map_err(|e| GemError::SignatureRejected(e.to_string()))?;

        let signature = self.wallet.send_transaction(&signed).await?;
        lifecycle.advance(TxState::Submitted);
        debug!(%signature, instructions = all.len(), "transaction submitted");

        match tokio::time::timeout(self.confirmation_timeout, self.ledger.confirm(&signature)).await
        {
            Ok(confirmed) => confirmed?,
            Err(_) => {
                return Err(GemError::ConfirmationTimeout(
                    self.confirmation_timeout.as_secs(),
                ))
            }
        }

        lifecycle.advance(TxState::Confirmed);
        info!(%signature, "transaction confirmed");
        Ok(signature)
    }
}
