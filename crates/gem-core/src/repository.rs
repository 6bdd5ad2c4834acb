//! Read models assembled from ledger state and off-ledger metadata.
//!
//! Nothing is cached: every call re-reads the ledger and rebuilds its
//! records, which belong to the caller.

use std::sync::Arc;

use alloy_primitives::U256;
use gem_sol::Address;
use tracing::debug;

use crate::error::{Action, GemError, OperationError};
use crate::ledger::LedgerReader;
use crate::metadata::{MetadataService, TokenMetadata};
use crate::rewards::{compute_claimable, group_by_target};
use crate::seeds::ProtocolAddresses;
use crate::state::{
    FundsLocation, GemAccount, GlobalGems, PositionClass, Rarity, VoteAccountData,
};

/// A gem as shown to its owner: decoded ledger state plus display attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub mint: Address,
    /// Where [`Position::account`] was read from.
    pub state_address: Address,
    pub image: String,
    pub video: Option<String>,
    pub generation: Option<u32>,
    pub class_label: Option<String>,
    pub account: GemAccount,
}

impl Position {
    pub fn class(&self) -> PositionClass {
        self.account.class
    }

    pub fn rarity(&self) -> Option<Rarity> {
        self.account.rarity
    }

    pub fn funds_location(&self) -> FundsLocation {
        self.account.funds_location
    }

    /// Value sits in the pre-delegation pool.
    pub fn is_allocated(&self) -> bool {
        self.account.funds_location == FundsLocation::Pooled
    }

    pub fn is_delegated(&self) -> bool {
        self.delegation_target().is_some()
    }

    pub fn delegation_target(&self) -> Option<Address> {
        match self.account.funds_location {
            FundsLocation::Delegated(target) => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionReward {
    pub mint: Address,
    pub image: String,
    pub delegation_target: Address,
    pub amount: U256,
}

/// A registered validator gems can be delegated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationTarget {
    pub vote_account: Address,
    pub validator_id: Address,
}

pub struct GemRepository {
    ledger: Arc<dyn LedgerReader>,
    metadata: Arc<dyn MetadataService>,
    addresses: Arc<ProtocolAddresses>,
    protocol_share: u64,
}

impl GemRepository {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        metadata: Arc<dyn MetadataService>,
        addresses: Arc<ProtocolAddresses>,
        protocol_share: u64,
    ) -> Self {
        Self {
            ledger,
            metadata,
            addresses,
            protocol_share,
        }
    }

    /// Every protocol gem held by `owner`.
    pub async fn list_positions(&self, owner: &Address) -> Result<Vec<Position>, OperationError> {
        self.positions_of(owner)
            .await
            .map_err(|e| e.during(Action::Load))
    }

    pub async fn load_position(&self, mint: &Address) -> Result<Position, OperationError> {
        self.position(mint).await.map_err(|e| e.during(Action::Load))
    }

    /// Claimable rewards of `owner`'s delegated gems. Each target's reward
    /// ledger is read once, however many gems point at it.
    pub async fn list_rewards(
        &self,
        owner: &Address,
    ) -> Result<Vec<PositionReward>, OperationError> {
        self.rewards_of(owner)
            .await
            .map_err(|e| e.during(Action::Load))
    }

    /// Registered delegation targets, most recently registered first.
    pub async fn list_delegation_targets(
        &self,
    ) -> Result<Vec<DelegationTarget>, OperationError> {
        self.delegation_targets()
            .await
            .map_err(|e| e.during(Action::ListTargets))
    }

    async fn positions_of(&self, owner: &Address) -> Result<Vec<Position>, GemError> {
        let tokens = self.metadata.find_tokens_by_owner(owner).await?;

        let mut positions = Vec::new();
        for token in tokens {
            if token.collection != Some(self.addresses.collection_mint) {
                debug!(mint = %token.mint, "skipping token outside the gem collection");
                continue;
            }
            positions.push(self.position(&token.mint).await?);
        }
        Ok(positions)
    }

    async fn position(&self, mint: &Address) -> Result<Position, GemError> {
        let metadata = self.metadata.load_metadata(mint).await?;
        let state_address = self.addresses.gem_account(mint)?;
        let raw = self
            .ledger
            .get_account_info(&state_address)
            .await?
            .ok_or(GemError::AccountNotFound(state_address))?;
        let account = GemAccount::decode(&raw)?;

        Ok(hydrate(*mint, state_address, account, metadata))
    }

    async fn rewards_of(&self, owner: &Address) -> Result<Vec<PositionReward>, GemError> {
        let positions = self.positions_of(owner).await?;
        let delegated = positions
            .into_iter()
            .filter_map(|p| p.delegation_target().map(|target| (target, p)));

        let mut rewards = Vec::new();
        for (target, members) in group_by_target(delegated) {
            let Some(ledger) = self.vote_data(&target).await? else {
                debug!(%target, "no reward ledger for delegation target");
                continue;
            };
            for position in members {
                rewards.push(PositionReward {
                    amount: compute_claimable(&position.account, &ledger, self.protocol_share),
                    mint: position.mint,
                    image: position.image,
                    delegation_target: target,
                });
            }
        }
        Ok(rewards)
    }

    async fn delegation_targets(&self) -> Result<Vec<DelegationTarget>, GemError> {
        let raw = self
            .ledger
            .get_account_info(&self.addresses.global_gems)
            .await?
            .ok_or(GemError::AccountNotFound(self.addresses.global_gems))?;
        let global = GlobalGems::decode(&raw)?;

        let mut targets = Vec::new();
        for index in (0..global.proposal_numeration).rev() {
            let vote_account = self.addresses.vote_account(index)?;
            match self.vote_data(&vote_account).await? {
                Some(data) => targets.push(DelegationTarget {
                    vote_account,
                    validator_id: data.validator_id,
                }),
                None => debug!(index, %vote_account, "registered target has no vote data"),
            }
        }
        Ok(targets)
    }

    /// Reward ledger of `vote_account`, or `None` if it has none yet.
    pub(crate) async fn vote_data(
        &self,
        vote_account: &Address,
    ) -> Result<Option<VoteAccountData>, GemError> {
        let address = self.addresses.vote_data(vote_account)?;
        self.ledger
            .get_account_info(&address)
            .await?
            .map(|raw| VoteAccountData::decode(&raw))
            .transpose()
    }
}

fn hydrate(
    mint: Address,
    state_address: Address,
    account: GemAccount,
    metadata: TokenMetadata,
) -> Position {
    Position {
        mint,
        state_address,
        video: metadata.video().map(str::to_owned),
        generation: metadata.generation(),
        class_label: metadata.class_label(),
        image: metadata.image,
        account,
    }
}
