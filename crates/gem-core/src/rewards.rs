//! Claimable reward computation.
//!
//! A position earns from every epoch in its target's reward ledger after its
//! baseline epoch (the later of its last delegation and last withdrawal).
//! Per epoch the position's contribution is
//!
//! ```text
//! total_reward * protocol_share / 100 / total_stake * class_weight
//! ```
//!
//! evaluated left to right in integer arithmetic, each division truncating.

use alloy_primitives::U256;
use gem_sol::Address;
use tracing::warn;

use crate::state::{GemAccount, PositionClass, RewardEpochRecord, VoteAccountData};

/// The epoch after which the position starts earning again.
pub fn baseline_epoch(position: &GemAccount) -> U256 {
    position
        .last_delegation_epoch
        .max(position.last_withdrawal_epoch)
}

/// Index of the first ledger record that still counts: one past the record
/// for `baseline`, or the start of the ledger when `baseline` has no record.
pub fn start_index(ledger: &[RewardEpochRecord], baseline: U256) -> usize {
    ledger
        .iter()
        .position(|r| r.epoch == baseline)
        .map_or(0, |i| i + 1)
}

/// Sum of per-epoch contributions for a position of `class` from
/// `ledger[start..]`.
pub fn accumulate(
    ledger: &[RewardEpochRecord],
    start: usize,
    class: PositionClass,
    protocol_share: u64,
) -> U256 {
    let share = U256::from(protocol_share);
    let hundred = U256::from(100u64);
    let weight = U256::from(class.weight());

    ledger
        .iter()
        .skip(start)
        .fold(U256::ZERO, |total, record| {
            if record.total_stake.is_zero() {
                warn!(epoch = %record.epoch, "reward record with zero stake contributes nothing");
                return total;
            }
            let contribution =
                record.total_reward * share / hundred / record.total_stake * weight;
            total.saturating_add(contribution)
        })
}

/// Claimable amount for `position` against its delegation target's ledger.
pub fn compute_claimable(
    position: &GemAccount,
    target: &VoteAccountData,
    protocol_share: u64,
) -> U256 {
    let start = start_index(&target.rewards, baseline_epoch(position));
    accumulate(&target.rewards, start, position.class, protocol_share)
}

/// Group items by delegation target, keeping targets in first-seen order and
/// items in input order within each target.
pub fn group_by_target<T>(items: impl IntoIterator<Item = (Address, T)>) -> Vec<(Address, Vec<T>)> {
    let mut groups: Vec<(Address, Vec<T>)> = Vec::new();
    for (target, item) in items {
        match groups.iter_mut().find(|(t, _)| *t == target) {
            Some((_, members)) => members.push(item),
            None => groups.push((target, vec![item])),
        }
    }
    groups
}
