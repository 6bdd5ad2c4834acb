//! Decoding of on-ledger account state.
//!
//! Every protocol account starts with a one-byte schema id followed by a
//! fixed little-endian layout. Decoding goes through [`SCHEMAS`], a table from
//! schema id to a pure decode function, so a new account layout is a new
//! table entry rather than a change to an existing decoder.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use gem_sol::Address;

use crate::error::GemError;

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Gem class. The ordinal is what the program stores; the weight is the
/// value (in whole SOL) a gem of this class represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionClass {
    Ruby = 0,
    Diamond = 1,
    Sapphire = 2,
    Emerald = 3,
    Serendibite = 4,
    Benitoite = 5,
}

impl PositionClass {
    pub const ALL: [PositionClass; 6] = [
        PositionClass::Ruby,
        PositionClass::Diamond,
        PositionClass::Sapphire,
        PositionClass::Emerald,
        PositionClass::Serendibite,
        PositionClass::Benitoite,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn weight(self) -> u64 {
        match self {
            PositionClass::Ruby => 500,
            PositionClass::Diamond => 100,
            PositionClass::Sapphire => 50,
            PositionClass::Emerald => 20,
            PositionClass::Serendibite => 10,
            PositionClass::Benitoite => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PositionClass::Ruby => "Ruby",
            PositionClass::Diamond => "Diamond",
            PositionClass::Sapphire => "Sapphire",
            PositionClass::Emerald => "Emerald",
            PositionClass::Serendibite => "Serendibite",
            PositionClass::Benitoite => "Benitoite",
        }
    }
}

impl TryFrom<u8> for PositionClass {
    type Error = GemError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(v as usize)
            .copied()
            .ok_or_else(|| GemError::MalformedAccountData(format!("unknown class ordinal {v}")))
    }
}

impl FromStr for PositionClass {
    type Err = GemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| GemError::Metadata(format!("unknown class label {s:?}")))
    }
}

impl fmt::Display for PositionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Exalted = 3,
    Mythic = 4,
}

impl TryFrom<u8> for Rarity {
    type Error = GemError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Rarity::Common),
            1 => Ok(Rarity::Uncommon),
            2 => Ok(Rarity::Rare),
            3 => Ok(Rarity::Exalted),
            4 => Ok(Rarity::Mythic),
            _ => Err(GemError::MalformedAccountData(format!(
                "unknown rarity ordinal {v}"
            ))),
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Exalted => "Exalted",
            Rarity::Mythic => "Mythic",
        };
        f.write_str(s)
    }
}

/// Where a position's value currently sits. Exactly one variant holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FundsLocation {
    Unallocated,
    /// In the shared pre-delegation pool.
    Pooled,
    /// Delegated to the given vote account.
    Delegated(Address),
}

impl FundsLocation {
    pub fn tag(&self) -> u8 {
        match self {
            FundsLocation::Unallocated => 0,
            FundsLocation::Pooled => 1,
            FundsLocation::Delegated(_) => 2,
        }
    }
}

type FundsDecodeFn = fn(&mut ByteReader<'_>) -> Result<FundsLocation, GemError>;

/// Indexed by discriminant byte.
const FUNDS_VARIANTS: [FundsDecodeFn; 3] = [funds_unallocated, funds_pooled, funds_delegated];

fn funds_unallocated(_: &mut ByteReader<'_>) -> Result<FundsLocation, GemError> {
    Ok(FundsLocation::Unallocated)
}

fn funds_pooled(_: &mut ByteReader<'_>) -> Result<FundsLocation, GemError> {
    Ok(FundsLocation::Pooled)
}

fn funds_delegated(r: &mut ByteReader<'_>) -> Result<FundsLocation, GemError> {
    r.address().map(FundsLocation::Delegated)
}

// ---------------------------------------------------------------------------
// Account records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GemAccount {
    pub class: PositionClass,
    /// Sequence number within the class.
    pub numeration: u32,
    pub date_created: u32,
    /// Revealed by the rarity imprint.
    pub rarity: Option<Rarity>,
    pub date_allocated: Option<u32>,
    pub rarity_seed_time: Option<u32>,
    pub last_delegation_epoch: U256,
    pub last_withdrawal_epoch: U256,
    pub funds_location: FundsLocation,
}

impl GemAccount {
    pub const MIN_LEN: usize = 39;

    pub fn decode(raw: &[u8]) -> Result<Self, GemError> {
        match decode(SchemaId::GemAccount, raw)? {
            AccountState::Gem(gem) => Ok(gem),
            other => Err(unexpected(SchemaId::GemAccount, &other)),
        }
    }
}

/// One epoch's snapshot in a delegation target's reward ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardEpochRecord {
    pub epoch: U256,
    pub total_reward: U256,
    pub total_stake: U256,
}

impl RewardEpochRecord {
    pub const LEN: usize = 24;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteAccountData {
    pub validator_id: Address,
    /// Ordered by non-decreasing epoch.
    pub rewards: Vec<RewardEpochRecord>,
}

impl VoteAccountData {
    pub const MIN_LEN: usize = 37;

    pub fn decode(raw: &[u8]) -> Result<Self, GemError> {
        match decode(SchemaId::VoteAccountData, raw)? {
            AccountState::VoteData(data) => Ok(data),
            other => Err(unexpected(SchemaId::VoteAccountData, &other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalGems {
    pub counter: u32,
    pub total_raised: U256,
    /// Number of registered delegation targets.
    pub proposal_numeration: u32,
}

impl GlobalGems {
    pub const LEN: usize = 17;

    pub fn decode(raw: &[u8]) -> Result<Self, GemError> {
        match decode(SchemaId::GlobalGems, raw)? {
            AccountState::Global(global) => Ok(global),
            other => Err(unexpected(SchemaId::GlobalGems, &other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaId {
    GemAccount = 1,
    VoteAccountData = 2,
    GlobalGems = 3,
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaId::GemAccount => "GemAccount",
            SchemaId::VoteAccountData => "VoteAccountData",
            SchemaId::GlobalGems => "GlobalGems",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountState {
    Gem(GemAccount),
    VoteData(VoteAccountData),
    Global(GlobalGems),
}

type DecodeFn = fn(&mut ByteReader<'_>) -> Result<AccountState, GemError>;

struct Schema {
    id: SchemaId,
    min_len: usize,
    decode: DecodeFn,
}

const SCHEMAS: &[Schema] = &[
    Schema {
        id: SchemaId::GemAccount,
        min_len: GemAccount::MIN_LEN,
        decode: decode_gem_account,
    },
    Schema {
        id: SchemaId::VoteAccountData,
        min_len: VoteAccountData::MIN_LEN,
        decode: decode_vote_data,
    },
    Schema {
        id: SchemaId::GlobalGems,
        min_len: GlobalGems::LEN,
        decode: decode_global_gems,
    },
];

/// Decode `raw` as the account kind identified by `schema`.
///
/// Fails with [`GemError::MalformedAccountData`] when the buffer is shorter
/// than the schema's minimum, carries a different schema id, or contains a
/// discriminant with no known variant.
pub fn decode(schema: SchemaId, raw: &[u8]) -> Result<AccountState, GemError> {
    let entry = SCHEMAS
        .iter()
        .find(|s| s.id == schema)
        .ok_or_else(|| GemError::MalformedAccountData(format!("no decoder for {schema}")))?;

    if raw.len() < entry.min_len {
        return Err(GemError::MalformedAccountData(format!(
            "{schema} needs at least {} bytes, got {}",
            entry.min_len,
            raw.len()
        )));
    }

    let mut reader = ByteReader::new(raw);
    let found = reader.u8()?;
    if found != schema as u8 {
        return Err(GemError::MalformedAccountData(format!(
            "expected {schema} (schema {}), found schema {found}",
            schema as u8
        )));
    }

    (entry.decode)(&mut reader)
}

fn unexpected(schema: SchemaId, got: &AccountState) -> GemError {
    GemError::MalformedAccountData(format!("{schema} decoder returned {got:?}"))
}

fn decode_gem_account(r: &mut ByteReader<'_>) -> Result<AccountState, GemError> {
    let class = PositionClass::try_from(r.u8()?)?;
    let numeration = r.u32()?;
    let date_created = r.u32()?;
    let rarity = r.option(|r| r.u8())?.map(Rarity::try_from).transpose()?;
    let date_allocated = r.option(|r| r.u32())?;
    let rarity_seed_time = r.option(|r| r.u32())?;
    let last_delegation_epoch = U256::from(r.u64()?);
    let last_withdrawal_epoch = U256::from(r.u64()?);

    let tag = r.u8()?;
    let variant = FUNDS_VARIANTS.get(tag as usize).ok_or_else(|| {
        GemError::MalformedAccountData(format!("unknown funds location tag {tag}"))
    })?;
    let funds_location = variant(r)?;

    Ok(AccountState::Gem(GemAccount {
        class,
        numeration,
        date_created,
        rarity,
        date_allocated,
        rarity_seed_time,
        last_delegation_epoch,
        last_withdrawal_epoch,
        funds_location,
    }))
}

fn decode_vote_data(r: &mut ByteReader<'_>) -> Result<AccountState, GemError> {
    let validator_id = r.address()?;
    let count = r.u32()? as usize;

    let needed = count.saturating_mul(RewardEpochRecord::LEN);
    if r.remaining() < needed {
        return Err(GemError::MalformedAccountData(format!(
            "reward ledger declares {count} records but only {} bytes remain",
            r.remaining()
        )));
    }

    let mut rewards: Vec<RewardEpochRecord> = Vec::with_capacity(count);
    for _ in 0..count {
        let record = RewardEpochRecord {
            epoch: U256::from(r.u64()?),
            total_reward: U256::from(r.u64()?),
            total_stake: U256::from(r.u64()?),
        };
        if let Some(prev) = rewards.last() {
            if record.epoch < prev.epoch {
                return Err(GemError::MalformedAccountData(format!(
                    "reward ledger epochs decrease: {} after {}",
                    record.epoch, prev.epoch
                )));
            }
        }
        rewards.push(record);
    }

    Ok(AccountState::VoteData(VoteAccountData {
        validator_id,
        rewards,
    }))
}

fn decode_global_gems(r: &mut ByteReader<'_>) -> Result<AccountState, GemError> {
    Ok(AccountState::Global(GlobalGems {
        counter: r.u32()?,
        total_raised: U256::from(r.u64()?),
        proposal_numeration: r.u32()?,
    }))
}

// ---------------------------------------------------------------------------
// Byte reader
// ---------------------------------------------------------------------------

/// Little-endian cursor. Every read is bounds-checked.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], GemError> {
        let bytes: [u8; N] = self
            .data
            .get(self.pos..self.pos + N)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| {
                GemError::MalformedAccountData(format!(
                    "unexpected end of data at offset {} (need {N} more bytes)",
                    self.pos
                ))
            })?;
        self.pos += N;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8, GemError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, GemError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn u64(&mut self) -> Result<u64, GemError> {
        Ok(u64::from_le_bytes(self.take()?))
    }

    fn address(&mut self) -> Result<Address, GemError> {
        Ok(Address::new(self.take()?))
    }

    /// Fixed-width optional: a 0/1 tag followed by the payload, which is
    /// present (and skipped) even when the tag is 0.
    fn option<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, GemError>,
    ) -> Result<Option<T>, GemError> {
        let offset = self.pos;
        let tag = self.u8()?;
        let value = read(self)?;
        match tag {
            0 => Ok(None),
            1 => Ok(Some(value)),
            _ => Err(GemError::MalformedAccountData(format!(
                "invalid option tag {tag} at offset {offset}"
            ))),
        }
    }
}
