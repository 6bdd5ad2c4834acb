//! Account reference lists for each protocol instruction.
//!
//! The program reads its accounts positionally, so the order and the
//! signer/writable flags here are part of the wire contract. Programs the
//! instruction invokes are appended after the accounts the program reads.

use gem_sol::{
    derive_associated_token_address, derive_edition_address, derive_metadata_address,
    AccountMeta, Address, ASSOCIATED_TOKEN_PROGRAM_ID, STAKE_CONFIG_ID, STAKE_PROGRAM_ID,
    SYSTEM_PROGRAM_ID, SYSVAR_CLOCK_ID, SYSVAR_RENT_ID, SYSVAR_STAKE_HISTORY_ID,
    TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID,
};

use crate::config::PriceFeeds;
use crate::error::GemError;
use crate::seeds::ProtocolAddresses;

fn signer(pubkey: Address) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

fn writable(pubkey: Address) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

fn readonly(pubkey: Address) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

/// `mint` is a fresh keypair and must sign alongside the payer.
pub fn mint_position(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    Ok(vec![
        signer(*payer),
        signer(*mint),
        writable(addrs.mint_authority),
        writable(derive_associated_token_address(payer, mint)?),
        readonly(TOKEN_PROGRAM_ID),
        readonly(SYSVAR_RENT_ID),
        readonly(SYSTEM_PROGRAM_ID),
        writable(derive_metadata_address(mint)?),
        writable(addrs.minting_pool),
        writable(addrs.global_gems),
        writable(addrs.gem_account(mint)?),
        readonly(SYSVAR_CLOCK_ID),
        writable(addrs.collection_edition),
        readonly(addrs.collection_mint),
        readonly(addrs.collection_metadata),
        readonly(SYSTEM_PROGRAM_ID),
        readonly(TOKEN_PROGRAM_ID),
        readonly(ASSOCIATED_TOKEN_PROGRAM_ID),
        readonly(TOKEN_METADATA_PROGRAM_ID),
    ])
}

pub fn init_rarity_imprint(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    Ok(vec![
        signer(*payer),
        writable(addrs.gem_account(mint)?),
        readonly(*mint),
        writable(derive_associated_token_address(payer, mint)?),
        writable(addrs.mint_authority),
        readonly(derive_edition_address(mint)?),
        readonly(TOKEN_PROGRAM_ID),
        readonly(TOKEN_METADATA_PROGRAM_ID),
    ])
}

pub fn imprint_rarity(
    addrs: &ProtocolAddresses,
    feeds: &PriceFeeds,
    payer: &Address,
    mint: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    Ok(vec![
        signer(*payer),
        writable(addrs.gem_account(mint)?),
        readonly(*mint),
        writable(derive_associated_token_address(payer, mint)?),
        writable(addrs.mint_authority),
        readonly(feeds.btc),
        readonly(feeds.sol),
        readonly(feeds.eth),
        readonly(feeds.bnb),
        writable(derive_metadata_address(mint)?),
        readonly(derive_edition_address(mint)?),
        readonly(TOKEN_PROGRAM_ID),
        readonly(TOKEN_METADATA_PROGRAM_ID),
    ])
}

pub fn redeem(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    Ok(vec![
        signer(*payer),
        writable(*mint),
        writable(addrs.minting_pool),
        writable(derive_associated_token_address(payer, mint)?),
        writable(addrs.mint_authority),
        writable(addrs.gem_account(mint)?),
        writable(derive_metadata_address(mint)?),
        writable(derive_edition_address(mint)?),
        writable(addrs.collection_metadata),
        readonly(TOKEN_PROGRAM_ID),
        writable(addrs.treasury),
        readonly(SYSTEM_PROGRAM_ID),
        readonly(TOKEN_METADATA_PROGRAM_ID),
    ])
}

/// Shared by allocate and deallocate.
pub fn pool_transfer(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    Ok(vec![
        signer(*payer),
        readonly(*mint),
        writable(addrs.gem_account(mint)?),
        writable(derive_associated_token_address(payer, mint)?),
        writable(addrs.global_gems),
        writable(addrs.pd_pool),
        writable(addrs.minting_pool),
        readonly(SYSTEM_PROGRAM_ID),
    ])
}

pub fn delegate(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
    vote_account: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    stake_accounts(addrs, payer, mint, vote_account, true)
}

/// Same as [`delegate`] minus the stake account.
pub fn undelegate(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
    vote_account: &Address,
) -> Result<Vec<AccountMeta>, GemError> {
    stake_accounts(addrs, payer, mint, vote_account, false)
}

fn stake_accounts(
    addrs: &ProtocolAddresses,
    payer: &Address,
    mint: &Address,
    vote_account: &Address,
    with_stake_account: bool,
) -> Result<Vec<AccountMeta>, GemError> {
    let mut metas = vec![
        signer(*payer),
        writable(addrs.pd_pool),
        readonly(*vote_account),
        writable(addrs.vote_data(vote_account)?),
    ];
    if with_stake_account {
        metas.push(writable(addrs.stake_account(vote_account)?));
    }
    metas.extend([
        readonly(*mint),
        writable(addrs.gem_account(mint)?),
        writable(derive_associated_token_address(payer, mint)?),
        writable(addrs.global_gems),
        writable(SYSVAR_CLOCK_ID),
        writable(SYSVAR_STAKE_HISTORY_ID),
        readonly(STAKE_CONFIG_ID),
        readonly(SYSTEM_PROGRAM_ID),
        readonly(STAKE_PROGRAM_ID),
    ]);
    Ok(metas)
}

/// One claim covers every position delegated to `vote_account`.
pub fn claim_rewards(
    addrs: &ProtocolAddresses,
    payer: &Address,
    vote_account: &Address,
    validator_id: &Address,
    mints: &[Address],
) -> Result<Vec<AccountMeta>, GemError> {
    let mut metas = Vec::with_capacity(6 + 3 * mints.len());
    metas.extend([
        signer(*payer),
        readonly(*vote_account),
        readonly(*validator_id),
        readonly(addrs.vote_data(vote_account)?),
        writable(addrs.authorized_withdrawer),
    ]);
    for mint in mints {
        metas.push(writable(derive_associated_token_address(payer, mint)?));
        metas.push(readonly(*mint));
        metas.push(writable(addrs.gem_account(mint)?));
    }
    metas.push(readonly(SYSTEM_PROGRAM_ID));
    Ok(metas)
}
