//! Transaction wire format, multi-signer signing, compute budget directive.
//!
//! We build transactions entirely by hand, with no `solana-sdk` dependency.
//! The wire format is a compact binary layout documented here:
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message:
//!     num_required_sigs     u8
//!     num_readonly_signed   u8
//!     num_readonly_unsigned u8
//!     num_accounts          compact-u16
//!     account_keys          32 bytes * num_accounts
//!     recent_blockhash      32 bytes
//!     num_instructions      compact-u16
//!     instructions[]        (see below)
//!
//! Instruction:
//!   program_id_index        u8
//!   num_accounts            compact-u16
//!   account_indices         u8 * num_accounts
//!   data_len                compact-u16
//!   data                    u8 * data_len
//! ```
//!
//! Instructions inside one message execute in order and atomically: the
//! ledger applies all of them or none.

use std::fmt;

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};

use crate::address::Address;
use crate::error::SolError;
use crate::keypair::Keypair;
use crate::programs::COMPUTE_BUDGET_PROGRAM_ID;

/// Largest serialized transaction the ledger accepts.
pub const PACKET_DATA_SIZE: usize = 1232;

/// Compute Budget `SetComputeUnitLimit` discriminant.
const SET_COMPUTE_UNIT_LIMIT_IX: u8 = 2;

// ---------------------------------------------------------------------------
// Compact-u16 encoding
// ---------------------------------------------------------------------------

/// Encode a `u16` value in the compact-u16 format.
///
/// - Values 0..0x7f       -> 1 byte
/// - Values 0x80..0x3fff  -> 2 bytes
/// - Values 0x4000..      -> 3 bytes
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut val = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (val & 0x7f) as u8;
        val >>= 7;
        if val > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if val == 0 {
            break;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account reference.
    pub fn new(pubkey: Address, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    /// A read-only account reference.
    pub fn new_readonly(pubkey: Address, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// An instruction before it is compiled into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// A compiled instruction where account references are replaced by u8 indices
/// into the message's `account_keys` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

/// The signed portion of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// All account keys referenced by this message, in canonical order:
    ///   1. writable signers (fee payer first)
    ///   2. read-only signers
    ///   3. writable non-signers
    ///   4. read-only non-signers
    pub account_keys: Vec<Address>,

    /// Number of required signatures (first N accounts are signers).
    pub num_required_signatures: u8,
    /// How many of the signing accounts are read-only.
    pub num_readonly_signed: u8,
    /// How many of the non-signing accounts are read-only.
    pub num_readonly_unsigned: u8,

    /// Recency token (blockhash) the message was built against.
    pub recent_blockhash: [u8; 32],

    pub instructions: Vec<CompiledInstruction>,
}

/// A 64-byte Ed25519 transaction signature. The first signature of a
/// transaction doubles as its id; the text form is Base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }

    fn is_empty(&self) -> bool {
        self.0 == [0u8; 64]
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self([0u8; 64])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// A message plus one signature slot per required signer. Unfilled slots
/// hold 64 zero bytes until the matching signer signs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

// ---------------------------------------------------------------------------
// Message compilation
// ---------------------------------------------------------------------------

/// Compile instructions into a message with a single fee payer.
///
/// The fee payer is always the first signer and is placed at index 0 in the
/// account keys. Duplicate account references are merged, keeping the union
/// of their signer/writable flags. Instruction order is preserved.
pub fn compile_message(
    instructions: &[Instruction],
    fee_payer: &Address,
    recent_blockhash: &[u8; 32],
) -> Result<Message, SolError> {
    if instructions.is_empty() {
        return Err(SolError::TransactionBuildError(
            "at least one instruction is required".into(),
        ));
    }

    // Instruction account lists are tiny, a linear scan beats a map here.
    struct AccountEntry {
        pubkey: Address,
        is_signer: bool,
        is_writable: bool,
    }

    let mut entries: Vec<AccountEntry> = Vec::new();

    let mut upsert = |pubkey: Address, signer: bool, writable: bool| {
        if let Some(entry) = entries.iter_mut().find(|e| e.pubkey == pubkey) {
            entry.is_signer |= signer;
            entry.is_writable |= writable;
        } else {
            entries.push(AccountEntry {
                pubkey,
                is_signer: signer,
                is_writable: writable,
            });
        }
    };

    // Fee payer is always signer + writable.
    upsert(*fee_payer, true, true);

    for ix in instructions {
        for meta in &ix.accounts {
            upsert(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        // Program ids are non-signer, read-only accounts.
        upsert(ix.program_id, false, false);
    }

    // Stable sort keeps insertion order within each category, so the fee
    // payer stays at index 0.
    entries.sort_by_key(|e| match (e.is_signer, e.is_writable) {
        (true, true) => 0u8,
        (true, false) => 1,
        (false, true) => 2,
        (false, false) => 3,
    });

    if entries.len() > u8::MAX as usize + 1 {
        return Err(SolError::TransactionBuildError(format!(
            "{} accounts exceed the 256 addressable by one message",
            entries.len()
        )));
    }

    let num_signers = entries.iter().filter(|e| e.is_signer).count() as u8;
    let num_readonly_signed = entries
        .iter()
        .filter(|e| e.is_signer && !e.is_writable)
        .count() as u8;
    let num_readonly_unsigned = entries
        .iter()
        .filter(|e| !e.is_signer && !e.is_writable)
        .count() as u8;

    let account_keys: Vec<Address> = entries.iter().map(|e| e.pubkey).collect();

    let index_of = |key: &Address, what: &str| -> Result<u8, SolError> {
        account_keys
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| SolError::TransactionBuildError(format!("{what} not in account keys")))
    };

    let mut compiled = Vec::with_capacity(instructions.len());
    for ix in instructions {
        let program_id_index = index_of(&ix.program_id, "program_id")?;

        let account_indices = ix
            .accounts
            .iter()
            .map(|meta| index_of(&meta.pubkey, "account"))
            .collect::<Result<Vec<u8>, SolError>>()?;

        compiled.push(CompiledInstruction {
            program_id_index,
            account_indices,
            data: ix.data.clone(),
        });
    }

    Ok(Message {
        account_keys,
        num_required_signatures: num_signers,
        num_readonly_signed,
        num_readonly_unsigned,
        recent_blockhash: *recent_blockhash,
        instructions: compiled,
    })
}

impl Message {
    /// Serialize the message (the bytes that get signed).
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);

        buf.push(self.num_required_signatures);
        buf.push(self.num_readonly_signed);
        buf.push(self.num_readonly_unsigned);

        buf.extend_from_slice(&encode_compact_u16(self.account_keys.len() as u16));
        for key in &self.account_keys {
            buf.extend_from_slice(key.as_bytes());
        }

        buf.extend_from_slice(&self.recent_blockhash);

        buf.extend_from_slice(&encode_compact_u16(self.instructions.len() as u16));
        for ix in &self.instructions {
            buf.push(ix.program_id_index);

            buf.extend_from_slice(&encode_compact_u16(ix.account_indices.len() as u16));
            buf.extend_from_slice(&ix.account_indices);

            buf.extend_from_slice(&encode_compact_u16(ix.data.len() as u16));
            buf.extend_from_slice(&ix.data);
        }

        buf
    }

    /// The accounts that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> &[Address] {
        let n = (self.num_required_signatures as usize).min(self.account_keys.len());
        &self.account_keys[..n]
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

impl Transaction {
    /// Wrap a message with empty signature slots.
    pub fn new_unsigned(message: Message) -> Self {
        let slots = message.signer_keys().len();
        Self {
            signatures: vec![Signature::default(); slots],
            message,
        }
    }

    /// Sign with `keypair`, writing into the slot that matches its pubkey.
    ///
    /// Other slots are left untouched, so local signers and a remote wallet
    /// can each contribute their own signature.
    pub fn partial_sign(&mut self, keypair: &Keypair) -> Result<(), SolError> {
        let pubkey = keypair.pubkey();
        let slot = self.slot_of(&pubkey)?;
        let message_bytes = self.message.serialize();
        self.signatures[slot] = Signature::new(keypair.sign(&message_bytes));
        Ok(())
    }

    fn slot_of(&self, pubkey: &Address) -> Result<usize, SolError> {
        self.message
            .signer_keys()
            .iter()
            .position(|k| k == pubkey)
            .ok_or_else(|| {
                SolError::SigningError(format!("{pubkey} is not a required signer"))
            })
    }

    /// Whether `pubkey`'s slot holds a signature that verifies.
    pub fn is_signed_by(&self, pubkey: &Address) -> bool {
        let Ok(slot) = self.slot_of(pubkey) else {
            return false;
        };
        verify_one(pubkey, &self.signatures[slot], &self.message.serialize())
    }

    /// Check that every required signer has a valid signature.
    pub fn verify_signatures(&self) -> Result<(), SolError> {
        let message_bytes = self.message.serialize();
        for (key, sig) in self.message.signer_keys().iter().zip(&self.signatures) {
            if sig.is_empty() {
                return Err(SolError::SigningError(format!("missing signature for {key}")));
            }
            if !verify_one(key, sig, &message_bytes) {
                return Err(SolError::SigningError(format!("invalid signature for {key}")));
            }
        }
        Ok(())
    }

    /// The transaction id: the fee payer's signature.
    pub fn signature(&self) -> Option<Signature> {
        self.signatures.first().copied().filter(|s| !s.is_empty())
    }

    /// Serialize into wire format, ready for `sendTransaction`.
    pub fn serialize(&self) -> Result<Vec<u8>, SolError> {
        let message_bytes = self.message.serialize();

        let mut wire = Vec::with_capacity(3 + 64 * self.signatures.len() + message_bytes.len());
        wire.extend_from_slice(&encode_compact_u16(self.signatures.len() as u16));
        for sig in &self.signatures {
            wire.extend_from_slice(&sig.0);
        }
        wire.extend_from_slice(&message_bytes);

        if wire.len() > PACKET_DATA_SIZE {
            return Err(SolError::SerializationError(format!(
                "transaction is {} bytes, limit is {PACKET_DATA_SIZE}",
                wire.len()
            )));
        }

        Ok(wire)
    }
}

fn verify_one(pubkey: &Address, signature: &Signature, message: &[u8]) -> bool {
    let Ok(vk) = VerifyingKey::from_bytes(pubkey.as_bytes()) else {
        return false;
    };
    vk.verify_strict(message, &DalekSignature::from_bytes(&signature.0))
        .is_ok()
}

// ---------------------------------------------------------------------------
// Compute budget
// ---------------------------------------------------------------------------

/// Build a `SetComputeUnitLimit` directive raising the compute budget of the
/// transaction it is placed in.
pub fn set_compute_unit_limit(units: u32) -> Instruction {
    let mut data = Vec::with_capacity(5);
    data.push(SET_COMPUTE_UNIT_LIMIT_IX);
    data.extend_from_slice(&units.to_le_bytes());

    Instruction {
        program_id: COMPUTE_BUDGET_PROGRAM_ID,
        accounts: Vec::new(),
        data,
    }
}
