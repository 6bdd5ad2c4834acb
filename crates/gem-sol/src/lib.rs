//! Ledger primitives for the gem protocol client.
//!
//! Addresses, keypairs, program-owned address derivation, well-known program
//! ids, and the transaction wire format, all without `solana-sdk`. Signing
//! uses `ed25519-dalek`, the on-curve check `curve25519-dalek`, and the text
//! form of addresses and signatures `bs58`.

pub mod address;
pub mod error;
pub mod keypair;
pub mod pda;
pub mod programs;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, Address};
pub use error::SolError;
pub use keypair::Keypair;
pub use pda::{find_program_address, is_on_curve};
pub use programs::{
    derive_associated_token_address, derive_edition_address, derive_metadata_address,
    ASSOCIATED_TOKEN_PROGRAM_ID, COMPUTE_BUDGET_PROGRAM_ID, STAKE_CONFIG_ID, STAKE_PROGRAM_ID,
    SYSTEM_PROGRAM_ID, SYSVAR_CLOCK_ID, SYSVAR_RENT_ID, SYSVAR_STAKE_HISTORY_ID,
    TOKEN_METADATA_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    compile_message, encode_compact_u16, set_compute_unit_limit, AccountMeta,
    CompiledInstruction, Instruction, Message, Signature, Transaction, PACKET_DATA_SIZE,
};
