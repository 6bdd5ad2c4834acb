//! Client for the gem staking protocol.
//!
//! Users mint gems (tokens that each represent a fixed amount of staked
//! value), allocate that value to the shared pool or delegate it to a
//! validator, reveal each gem's rarity, claim epoch rewards and redeem.
//! This crate derives the protocol's accounts, encodes its instructions,
//! decodes its on-ledger state, computes claimable rewards and drives
//! submission through pluggable ledger, metadata and wallet collaborators.
//!
//! Entry point is [`GemClient`]; read-only views live on [`GemRepository`].

pub mod accounts;
pub mod client;
pub mod config;
pub mod error;
pub mod imprint;
pub mod instruction;
pub mod ledger;
pub mod metadata;
pub mod orchestrator;
pub mod repository;
pub mod rewards;
pub mod seeds;
pub mod state;

pub use client::{ClaimRequest, GemClient};
pub use config::{GemConfig, PriceFeeds};
pub use error::{Action, GemError, OperationError};
pub use imprint::{RequestCommitted, Revealed};
pub use instruction::{GemInstruction, Opcode};
pub use ledger::{LedgerReader, WalletCapability};
pub use metadata::{MetadataService, TokenMetadata, TokenRecord};
pub use orchestrator::TransactionOrchestrator;
pub use repository::{DelegationTarget, GemRepository, Position, PositionReward};
pub use rewards::compute_claimable;
pub use seeds::ProtocolAddresses;
pub use state::{
    FundsLocation, GemAccount, GlobalGems, PositionClass, Rarity, RewardEpochRecord, SchemaId,
    VoteAccountData,
};

pub use alloy_primitives::U256;
pub use gem_sol::{Address, Keypair, Signature};
