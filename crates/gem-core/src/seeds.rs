//! Seed tags and the protocol's derived addresses.
//!
//! Singleton accounts (pools, treasury, registry, collection) depend only on
//! the program id, so they are derived once into [`ProtocolAddresses`] and
//! shared read-only. Per-token and per-target accounts are derived on demand.

use gem_sol::{derive_edition_address, derive_metadata_address, find_program_address, Address};

use crate::error::GemError;

pub const GEM_ACCOUNT_SEED: &[u8] = b"gem-account";
pub const MINT_AUTHORITY_SEED: &[u8] = b"mint-authority";
pub const MINTING_POOL_SEED: &[u8] = b"minting-pool";
pub const COLLECTION_SEED: &[u8] = b"nft-collection";
pub const TREASURY_SEED: &[u8] = b"treasury";
pub const GLOBAL_GEMS_SEED: &[u8] = b"global-gems";
pub const PD_POOL_SEED: &[u8] = b"pd-pool";
pub const AUTHORIZED_WITHDRAWER_SEED: &[u8] = b"authorized-withdrawer";
pub const VOTE_DATA_SEED: &[u8] = b"vote-data";
pub const STAKE_ACCOUNT_SEED: &[u8] = b"stake-account";
pub const VOTE_ACCOUNT_SEED: &[u8] = b"vote-account";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolAddresses {
    pub program_id: Address,
    pub mint_authority: Address,
    pub minting_pool: Address,
    pub collection_mint: Address,
    pub collection_metadata: Address,
    pub collection_edition: Address,
    pub treasury: Address,
    pub global_gems: Address,
    pub pd_pool: Address,
    pub authorized_withdrawer: Address,
}

impl ProtocolAddresses {
    pub fn derive(program_id: Address) -> Result<Self, GemError> {
        let pda = |seed: &[u8]| derive(&[seed], &program_id);
        let collection_mint = pda(COLLECTION_SEED)?;

        Ok(Self {
            program_id,
            mint_authority: pda(MINT_AUTHORITY_SEED)?,
            minting_pool: pda(MINTING_POOL_SEED)?,
            collection_mint,
            collection_metadata: derive_metadata_address(&collection_mint)?,
            collection_edition: derive_edition_address(&collection_mint)?,
            treasury: pda(TREASURY_SEED)?,
            global_gems: pda(GLOBAL_GEMS_SEED)?,
            pd_pool: pda(PD_POOL_SEED)?,
            authorized_withdrawer: pda(AUTHORIZED_WITHDRAWER_SEED)?,
        })
    }

    /// State account of the position minted as `mint`.
    pub fn gem_account(&self, mint: &Address) -> Result<Address, GemError> {
        derive(&[GEM_ACCOUNT_SEED, mint.as_bytes()], &self.program_id)
    }

    /// Reward ledger of a delegation target.
    pub fn vote_data(&self, vote_account: &Address) -> Result<Address, GemError> {
        derive(&[VOTE_DATA_SEED, vote_account.as_bytes()], &self.program_id)
    }

    /// Stake account the protocol delegates to `vote_account`.
    pub fn stake_account(&self, vote_account: &Address) -> Result<Address, GemError> {
        derive(&[STAKE_ACCOUNT_SEED, vote_account.as_bytes()], &self.program_id)
    }

    /// The `index`-th registered delegation target.
    pub fn vote_account(&self, index: u32) -> Result<Address, GemError> {
        derive(&[VOTE_ACCOUNT_SEED, &index.to_be_bytes()], &self.program_id)
    }
}

fn derive(seeds: &[&[u8]], program_id: &Address) -> Result<Address, GemError> {
    let (address, _bump) = find_program_address(seeds, program_id)?;
    Ok(address)
}
