//! User-facing protocol operations.
//!
//! Each mutating method derives the accounts it needs, encodes the
//! instruction and hands it to the [`TransactionOrchestrator`]. Failures come
//! back as [`OperationError`]s naming the action.

use std::sync::Arc;

use gem_sol::{AccountMeta, Address, Instruction, Keypair, Signature};
use tracing::info;

use crate::accounts;
use crate::config::GemConfig;
use crate::error::{Action, GemError, OperationError};
use crate::imprint::{RequestCommitted, Revealed};
use crate::instruction::GemInstruction;
use crate::ledger::{LedgerReader, WalletCapability};
use crate::metadata::MetadataService;
use crate::orchestrator::TransactionOrchestrator;
use crate::repository::{DelegationTarget, GemRepository, Position, PositionReward};
use crate::rewards::group_by_target;
use crate::seeds::ProtocolAddresses;
use crate::state::PositionClass;

/// A delegated gem to claim for, and the target it is delegated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRequest {
    pub mint: Address,
    pub vote_account: Address,
}

pub struct GemClient {
    config: GemConfig,
    addresses: Arc<ProtocolAddresses>,
    orchestrator: TransactionOrchestrator,
    repository: GemRepository,
}

impl GemClient {
    pub fn new(
        config: GemConfig,
        ledger: Arc<dyn LedgerReader>,
        metadata: Arc<dyn MetadataService>,
        wallet: Arc<dyn WalletCapability>,
    ) -> Result<Self, GemError> {
        config.validate()?;
        let addresses = Arc::new(ProtocolAddresses::derive(config.program_id)?);
        let orchestrator =
            TransactionOrchestrator::new(ledger.clone(), wallet, config.confirmation_timeout());
        let repository =
            GemRepository::new(ledger, metadata, addresses.clone(), config.protocol_share);

        Ok(Self {
            config,
            addresses,
            orchestrator,
            repository,
        })
    }

    pub fn config(&self) -> &GemConfig {
        &self.config
    }

    pub fn addresses(&self) -> &ProtocolAddresses {
        &self.addresses
    }

    pub fn repository(&self) -> &GemRepository {
        &self.repository
    }

    // -- Mutations -----------------------------------------------------------

    /// Mint a gem of `class` and return its token address.
    pub async fn mint(&self, class: PositionClass) -> Result<Address, OperationError> {
        self.try_mint(class).await.map_err(|e| e.during(Action::Mint))
    }

    async fn try_mint(&self, class: PositionClass) -> Result<Address, GemError> {
        let payer = self.orchestrator.fee_payer()?;
        let mint = Keypair::generate();
        let mint_address = mint.pubkey();

        let metas = accounts::mint_position(&self.addresses, &payer, &mint_address)?;
        let ix = GemInstruction::MintPosition { class }.into_instruction(self.program_id(), metas);

        self.orchestrator
            .submit(vec![ix], payer, &[&mint], Some(self.config.mint_compute_units))
            .await?;
        info!(mint = %mint_address, %class, "gem minted");
        Ok(mint_address)
    }

    /// First imprint phase: commit the randomness request.
    pub async fn request_imprint(&self, mint: &Address) -> Result<RequestCommitted, OperationError> {
        self.try_request_imprint(mint)
            .await
            .map_err(|e| e.during(Action::Imprint))
    }

    async fn try_request_imprint(&self, mint: &Address) -> Result<RequestCommitted, GemError> {
        let payer = self.orchestrator.fee_payer()?;
        let metas = accounts::init_rarity_imprint(&self.addresses, &payer, mint)?;
        let ix = GemInstruction::InitRarityImprint.into_instruction(self.program_id(), metas);

        let signature = self.orchestrator.submit(vec![ix], payer, &[], None).await?;
        Ok(RequestCommitted::new(*mint, signature))
    }

    /// Second imprint phase. Waits until the configured delay has passed
    /// since the request was confirmed, then reveals.
    pub async fn reveal_imprint(
        &self,
        request: RequestCommitted,
    ) -> Result<Revealed, OperationError> {
        self.try_reveal_imprint(request)
            .await
            .map_err(|e| e.during(Action::Imprint))
    }

    async fn try_reveal_imprint(&self, request: RequestCommitted) -> Result<Revealed, GemError> {
        tokio::time::sleep_until(request.reveal_at(self.config.imprint_delay())).await;

        let payer = self.orchestrator.fee_payer()?;
        let metas =
            accounts::imprint_rarity(&self.addresses, &self.config.price_feeds, &payer, &request.mint)?;
        let ix = GemInstruction::ImprintRarity.into_instruction(self.program_id(), metas);

        let signature = self.orchestrator.submit(vec![ix], payer, &[], None).await?;
        info!(mint = %request.mint, "rarity revealed");
        Ok(request.revealed(signature))
    }

    /// Both imprint phases back to back.
    pub async fn imprint(&self, mint: &Address) -> Result<Revealed, OperationError> {
        let request = self.request_imprint(mint).await?;
        self.reveal_imprint(request).await
    }

    pub async fn redeem(&self, mint: &Address) -> Result<Signature, OperationError> {
        self.single(Action::Redeem, GemInstruction::Redeem, |a, payer| {
            accounts::redeem(a, payer, mint)
        })
        .await
    }

    /// Move the gem's value into the pre-delegation pool.
    pub async fn allocate(&self, mint: &Address) -> Result<Signature, OperationError> {
        self.single(Action::Allocate, GemInstruction::AllocateValue, |a, payer| {
            accounts::pool_transfer(a, payer, mint)
        })
        .await
    }

    pub async fn deallocate(&self, mint: &Address) -> Result<Signature, OperationError> {
        self.single(Action::Deallocate, GemInstruction::DeallocateValue, |a, payer| {
            accounts::pool_transfer(a, payer, mint)
        })
        .await
    }

    pub async fn delegate(
        &self,
        mint: &Address,
        vote_account: &Address,
    ) -> Result<Signature, OperationError> {
        self.single(Action::Delegate, GemInstruction::DelegateValue, |a, payer| {
            accounts::delegate(a, payer, mint, vote_account)
        })
        .await
    }

    pub async fn undelegate(
        &self,
        mint: &Address,
        vote_account: &Address,
    ) -> Result<Signature, OperationError> {
        self.single(Action::Undelegate, GemInstruction::UndelegateValue, |a, payer| {
            accounts::undelegate(a, payer, mint, vote_account)
        })
        .await
    }

    /// Claim rewards for several gems in one transaction: one claim
    /// instruction per delegation target, all or nothing.
    pub async fn claim(&self, requests: &[ClaimRequest]) -> Result<Signature, OperationError> {
        self.try_claim(requests)
            .await
            .map_err(|e| e.during(Action::Claim))
    }

    async fn try_claim(&self, requests: &[ClaimRequest]) -> Result<Signature, GemError> {
        if requests.is_empty() {
            return Err(GemError::Transaction("no positions to claim".into()));
        }
        let payer = self.orchestrator.fee_payer()?;

        let groups = group_by_target(requests.iter().map(|r| (r.vote_account, r.mint)));
        let mut instructions: Vec<Instruction> = Vec::with_capacity(groups.len());
        for (vote_account, mints) in groups {
            let vote_data_address = self.addresses.vote_data(&vote_account)?;
            let vote_data = self
                .repository
                .vote_data(&vote_account)
                .await?
                .ok_or(GemError::AccountNotFound(vote_data_address))?;

            let metas = accounts::claim_rewards(
                &self.addresses,
                &payer,
                &vote_account,
                &vote_data.validator_id,
                &mints,
            )?;
            instructions.push(GemInstruction::ClaimRewards.into_instruction(self.program_id(), metas));
        }

        self.orchestrator
            .submit(instructions, payer, &[], Some(self.config.claim_compute_units))
            .await
    }

    async fn single<F>(
        &self,
        action: Action,
        instruction: GemInstruction,
        metas: F,
    ) -> Result<Signature, OperationError>
    where
        F: FnOnce(&ProtocolAddresses, &Address) -> Result<Vec<AccountMeta>, GemError>,
    {
        self.try_single(instruction, metas)
            .await
            .map_err(|e| e.during(action))
    }

    async fn try_single<F>(&self, instruction: GemInstruction, metas: F) -> Result<Signature, GemError>
    where
        F: FnOnce(&ProtocolAddresses, &Address) -> Result<Vec<AccountMeta>, GemError>,
    {
        let payer = self.orchestrator.fee_payer()?;
        let metas = metas(self.addresses.as_ref(), &payer)?;
        let ix = instruction.into_instruction(self.program_id(), metas);
        self.orchestrator.submit(vec![ix], payer, &[], None).await
    }

    fn program_id(&self) -> Address {
        self.addresses.program_id
    }

    // -- Queries -------------------------------------------------------------

    pub async fn list_positions(&self, owner: &Address) -> Result<Vec<Position>, OperationError> {
        self.repository.list_positions(owner).await
    }

    pub async fn load_position(&self, mint: &Address) -> Result<Position, OperationError> {
        self.repository.load_position(mint).await
    }

    pub async fn list_rewards(&self, owner: &Address) -> Result<Vec<PositionReward>, OperationError> {
        self.repository.list_rewards(owner).await
    }

    pub async fn list_delegation_targets(&self) -> Result<Vec<DelegationTarget>, OperationError> {
        self.repository.list_delegation_targets().await
    }
}
