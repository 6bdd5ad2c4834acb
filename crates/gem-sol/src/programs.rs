//! Well-known program ids and the addresses they derive.
//!
//! Covers the token program, associated token accounts (ATAs), the token
//! metadata program (metadata + master edition accounts), sysvars, the stake
//! program and the compute budget program, without pulling in `solana-sdk`
//! or any SPL crate.

use crate::address::Address;
use crate::error::SolError;
use crate::pda::find_program_address;

// ---------------------------------------------------------------------------
// Program ids
// ---------------------------------------------------------------------------

/// System Program: 32 zero bytes. Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: Address = Address::new([0u8; 32]);

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Address = Address::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb,
    0x79, 0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85,
    0x7e, 0xff, 0x00, 0xa9,
]);

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Address = Address::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e,
    0x0d, 0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8,
    0xdb, 0xe9, 0xf8, 0x59,
]);

/// Token Metadata Program ID: `metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s`
pub const TOKEN_METADATA_PROGRAM_ID: Address = Address::new([
    0x0b, 0x70, 0x65, 0xb1, 0xe3, 0xd1, 0x7c, 0x45, 0x38, 0x9d, 0x52, 0x7f, 0x6b, 0x04,
    0xc3, 0xcd, 0x58, 0xb8, 0x6c, 0x73, 0x1a, 0xa0, 0xfd, 0xb5, 0x49, 0xb6, 0xd1, 0xbc,
    0x03, 0xf8, 0x29, 0x46,
]);

/// Stake Program ID: `Stake11111111111111111111111111111111111111`
pub const STAKE_PROGRAM_ID: Address = Address::new([
    0x06, 0xa1, 0xd8, 0x17, 0x91, 0x37, 0x54, 0x2a, 0x98, 0x34, 0x37, 0xbd, 0xfe, 0x2a,
    0x7a, 0xb2, 0x55, 0x7f, 0x53, 0x5c, 0x8a, 0x78, 0x72, 0x2b, 0x68, 0xa4, 0x9d, 0xc0,
    0x00, 0x00, 0x00, 0x00,
]);

/// Stake Config account: `StakeConfig11111111111111111111111111111111`
pub const STAKE_CONFIG_ID: Address = Address::new([
    0x06, 0xa1, 0xd8, 0x17, 0xa5, 0x02, 0x05, 0x0b, 0x68, 0x07, 0x91, 0xe6, 0xce, 0x6d,
    0xb8, 0x8e, 0x1e, 0x5b, 0x71, 0x50, 0xf6, 0x1f, 0xc6, 0x79, 0x0a, 0x4e, 0xb4, 0xd1,
    0x00, 0x00, 0x00, 0x00,
]);

/// Compute Budget Program ID: `ComputeBudget111111111111111111111111111111`
pub const COMPUTE_BUDGET_PROGRAM_ID: Address = Address::new([
    0x03, 0x06, 0x46, 0x6f, 0xe5, 0x21, 0x17, 0x32, 0xff, 0xec, 0xad, 0xba, 0x72, 0xc3,
    0x9b, 0xe7, 0xbc, 0x8c, 0xe5, 0xbb, 0xc5, 0xf7, 0x12, 0x6b, 0x2c, 0x43, 0x9b, 0x3a,
    0x40, 0x00, 0x00, 0x00,
]);

// ---------------------------------------------------------------------------
// Sysvars
// ---------------------------------------------------------------------------

/// `SysvarRent111111111111111111111111111111111`
pub const SYSVAR_RENT_ID: Address = Address::new([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a,
    0xf1, 0x7f, 0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a,
    0x00, 0x00, 0x00, 0x00,
]);

/// `SysvarC1ock11111111111111111111111111111111`
pub const SYSVAR_CLOCK_ID: Address = Address::new([
    0x06, 0xa7, 0xd5, 0x17, 0x18, 0xc7, 0x74, 0xc9, 0x28, 0x56, 0x63, 0x98, 0x69, 0x1d,
    0x5e, 0xb6, 0x8b, 0x5e, 0xb8, 0xa3, 0x9b, 0x4b, 0x6d, 0x5c, 0x73, 0x55, 0x5b, 0x21,
    0x00, 0x00, 0x00, 0x00,
]);

/// `SysvarStakeHistory1111111111111111111111111`
pub const SYSVAR_STAKE_HISTORY_ID: Address = Address::new([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x35, 0x84, 0xd0, 0xfe, 0xed, 0x9b, 0xb3, 0x43, 0x1d,
    0x13, 0x20, 0x6b, 0xe5, 0x44, 0x28, 0x1b, 0x57, 0xb8, 0x56, 0x6c, 0xc5, 0x37, 0x5f,
    0xf4, 0x00, 0x00, 0x00,
]);

/// Seed prefix shared by every token-metadata account.
const METADATA_PREFIX: &[u8] = b"metadata";

/// Seed suffix of master edition accounts.
const EDITION_SUFFIX: &[u8] = b"edition";

// ---------------------------------------------------------------------------
// Derived accounts
// ---------------------------------------------------------------------------

/// Derive the associated token account address for a wallet + mint pair.
///
/// Seeds: `[wallet, token_program_id, mint]` under the ATA program.
pub fn derive_associated_token_address(
    wallet: &Address,
    mint: &Address,
) -> Result<Address, SolError> {
    find_program_address(
        &[wallet.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Derive the token-metadata account of `mint`.
///
/// Seeds: `["metadata", metadata_program_id, mint]` under the metadata program.
pub fn derive_metadata_address(mint: &Address) -> Result<Address, SolError> {
    find_program_address(
        &[METADATA_PREFIX, TOKEN_METADATA_PROGRAM_ID.as_ref(), mint.as_ref()],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

/// Derive the master edition account of `mint`.
///
/// Seeds: `["metadata", metadata_program_id, mint, "edition"]`.
pub fn derive_edition_address(mint: &Address) -> Result<Address, SolError> {
    find_program_address(
        &[
            METADATA_PREFIX,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
            EDITION_SUFFIX,
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::is_on_curve;

    // -- Constant verification ----------------------------------------------

    #[test]
    fn program_ids_match_base58() {
        let cases = [
            (TOKEN_PROGRAM_ID, "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"),
            (ASSOCIATED_TOKEN_PROGRAM_ID, "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"),
            (TOKEN_METADATA_PROGRAM_ID, "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s"),
            (STAKE_PROGRAM_ID, "Stake11111111111111111111111111111111111111"),
            (STAKE_CONFIG_ID, "StakeConfig11111111111111111111111111111111"),
            (COMPUTE_BUDGET_PROGRAM_ID, "ComputeBudget111111111111111111111111111111"),
            (SYSVAR_RENT_ID, "SysvarRent111111111111111111111111111111111"),
            (SYSVAR_CLOCK_ID, "SysvarC1ock11111111111111111111111111111111"),
            (SYSVAR_STAKE_HISTORY_ID, "SysvarStakeHistory1111111111111111111111111"),
            (SYSTEM_PROGRAM_ID, "11111111111111111111111111111111"),
        ];
        for (id, text) in cases {
            assert_eq!(id.to_string(), text);
        }
    }

    // -- Derived accounts ----------------------------------------------------

    #[test]
    fn ata_is_not_on_curve() {
        let wallet = Address::new([0xAA; 32]);
        let mint = Address::new([0xBB; 32]);

        let ata = derive_associated_token_address(&wallet, &mint).unwrap();
        assert!(!is_on_curve(ata.as_bytes()), "PDA must NOT be on the Ed25519 curve");
    }

    #[test]
    fn ata_differs_per_wallet_and_mint() {
        let mint = Address::new([0xFF; 32]);
        let a = derive_associated_token_address(&Address::new([1; 32]), &mint).unwrap();
        let b = derive_associated_token_address(&Address::new([2; 32]), &mint).unwrap();
        assert_ne!(a, b);

        let wallet = Address::new([0xAA; 32]);
        let c = derive_associated_token_address(&wallet, &Address::new([1; 32])).unwrap();
        let d = derive_associated_token_address(&wallet, &Address::new([2; 32])).unwrap();
        assert_ne!(c, d);
    }

    #[test]
    fn metadata_and_edition_differ() {
        let mint = Address::new([0x42; 32]);
        let metadata = derive_metadata_address(&mint).unwrap();
        let edition = derive_edition_address(&mint).unwrap();
        assert_ne!(metadata, edition);
        assert!(!is_on_curve(metadata.as_bytes()));
        assert!(!is_on_curve(edition.as_bytes()));
    }

    #[test]
    fn derive_ata_for_known_wallet_and_usdc_mint() {
        let usdc_mint: Address = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".parse().unwrap();
        let wallet = Address::new([0x42; 32]);

        let ata = derive_associated_token_address(&wallet, &usdc_mint).unwrap();
        let again = derive_associated_token_address(&wallet, &usdc_mint).unwrap();
        assert_eq!(ata, again);
        assert!(!is_on_curve(ata.as_bytes()));
    }
}
