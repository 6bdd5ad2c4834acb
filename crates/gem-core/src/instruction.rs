//! Outgoing instruction payloads.
//!
//! Wire format: `[opcode: u8][fixed-width args, little-endian]`. No argument
//! is variable-length, so nothing is length-prefixed.

use gem_sol::{AccountMeta, Address, Instruction};

use crate::error::GemError;
use crate::state::PositionClass;

/// Program instruction discriminants. `0` is the admin-only collection mint
/// and is never issued by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    MintPosition = 1,
    InitRarityImprint = 2,
    ImprintRarity = 3,
    Redeem = 4,
    AllocateValue = 5,
    DeallocateValue = 6,
    DelegateValue = 7,
    UndelegateValue = 8,
    ClaimRewards = 9,
}

impl TryFrom<u8> for Opcode {
    type Error = GemError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Ok(match v {
            1 => Opcode::MintPosition,
            2 => Opcode::InitRarityImprint,
            3 => Opcode::ImprintRarity,
            4 => Opcode::Redeem,
            5 => Opcode::AllocateValue,
            6 => Opcode::DeallocateValue,
            7 => Opcode::DelegateValue,
            8 => Opcode::UndelegateValue,
            9 => Opcode::ClaimRewards,
            _ => return Err(GemError::Transaction(format!("unknown opcode {v}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GemInstruction {
    MintPosition { class: PositionClass },
    InitRarityImprint,
    ImprintRarity,
    Redeem,
    AllocateValue,
    DeallocateValue,
    DelegateValue,
    UndelegateValue,
    ClaimRewards,
}

impl GemInstruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            GemInstruction::MintPosition { .. } => Opcode::MintPosition,
            GemInstruction::InitRarityImprint => Opcode::InitRarityImprint,
            GemInstruction::ImprintRarity => Opcode::ImprintRarity,
            GemInstruction::Redeem => Opcode::Redeem,
            GemInstruction::AllocateValue => Opcode::AllocateValue,
            GemInstruction::DeallocateValue => Opcode::DeallocateValue,
            GemInstruction::DelegateValue => Opcode::DelegateValue,
            GemInstruction::UndelegateValue => Opcode::UndelegateValue,
            GemInstruction::ClaimRewards => Opcode::ClaimRewards,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = vec![self.opcode() as u8];
        if let GemInstruction::MintPosition { class } = self {
            data.push(class.ordinal());
        }
        data
    }

    /// Pair the payload with its account list, addressed to `program_id`.
    pub fn into_instruction(self, program_id: Address, accounts: Vec<AccountMeta>) -> Instruction {
        Instruction {
            program_id,
            accounts,
            data: self.encode(),
        }
    }
}
