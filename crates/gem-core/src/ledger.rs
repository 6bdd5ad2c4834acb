//! Collaborators for ledger access and signing.
//!
//! The client never talks to the network itself. Reads, recency tokens and
//! confirmation go through a [`LedgerReader`]; signing and sending go through
//! the user's [`WalletCapability`]. Both are object-safe so callers can plug
//! in an RPC client, a browser bridge, or an in-memory mock.

use async_trait::async_trait;
use gem_sol::{Address, Signature, Transaction};

use crate::error::GemError;

/// Read access to the ledger.
///
/// Implementations map network errors to [`GemError::TransportFailure`] and
/// program execution errors to [`GemError::ProtocolRejected`]. They must not
/// retry internally.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Raw account data, or `None` if no account lives at `address`.
    async fn get_account_info(&self, address: &Address) -> Result<Option<Vec<u8>>, GemError>;

    /// A recent blockhash to build a transaction against.
    async fn get_latest_recency_token(&self) -> Result<[u8; 32], GemError>;

    /// Resolve once the transaction is confirmed. May wait indefinitely; the
    /// caller bounds it with its own timeout.
    async fn confirm(&self, signature: &Signature) -> Result<(), GemError>;
}

/// The connected wallet.
#[async_trait]
pub trait WalletCapability: Send + Sync {
    /// `None` while no wallet is connected.
    fn public_key(&self) -> Option<Address>;

    /// Add the wallet's signature. A user refusal is
    /// [`GemError::SignatureRejected`].
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction, GemError>;

    /// Broadcast a fully signed transaction and return its id.
    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature, GemError>;
}
