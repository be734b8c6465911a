//! Proposal records, consumed blinders and status derivation.

use soroban_sdk::{contracttype, Address, Env, Symbol, Val, Vec, U256};

use crate::error::ZkMultisigError;
use crate::storage::{DataKey, PROPOSAL_COUNT};

/// Fixed-point 100% for quorum percentages (1% = 10^25).
pub const PERCENTAGE_100: u128 = 1_000_000_000_000_000_000_000_000_000;

/// Contract call carried by a proposal
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalCall {
    pub func: Symbol,
    pub args: Vec<Val>,
}

/// What a proposal does once accepted: send `value` of the instance's value
/// asset to `target`, then invoke `call` on it (if any).
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalContent {
    pub target: Address,
    pub value: i128,
    pub call: Option<ProposalCall>,
}

#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalData {
    pub content: ProposalContent,
    pub proposal_end_time: u64,
    pub required_quorum: u32,
    pub blinders_count: u32,
    pub executed: bool,
}

#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalInfoView {
    pub content: ProposalContent,
    pub proposal_end_time: u64,
    pub status: ProposalStatus,
    pub votes_count: u32,
    pub required_quorum: u32,
}

#[contracttype]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalStatus {
    None,
    Voting,
    Accepted,
    Expired,
    Executed,
}

impl ProposalStatus {
    /// Status from live fields, in fixed priority order:
    /// no record, executed, quorum reached, still open, expired.
    ///
    /// Quorum outranks expiry so a proposal accepted in its last moment stays
    /// accepted forever, and execution outranks quorum.
    pub fn derive(
        end_time: u64,
        executed: bool,
        votes: u32,
        required_quorum: u32,
        now: u64,
    ) -> Self {
        if end_time == 0 {
            ProposalStatus::None
        } else if executed {
            ProposalStatus::Executed
        } else if votes >= required_quorum {
            ProposalStatus::Accepted
        } else if now < end_time {
            ProposalStatus::Voting
        } else {
            ProposalStatus::Expired
        }
    }
}

impl ProposalData {
    pub fn status(&self, now: u64) -> ProposalStatus {
        ProposalStatus::derive(
            self.proposal_end_time,
            self.executed,
            self.blinders_count,
            self.required_quorum,
            now,
        )
    }
}

/// `max(1, floor(participants * percentage / 100%))`
pub fn required_quorum(participants: u32, quorum_percentage: u128) -> u32 {
    let quorum = (participants as u128) * quorum_percentage / PERCENTAGE_100;
    if quorum == 0 {
        1
    } else {
        quorum as u32
    }
}

pub fn validate_quorum_percentage(quorum_percentage: u128) -> Result<(), ZkMultisigError> {
    if quorum_percentage == 0 || quorum_percentage > PERCENTAGE_100 {
        return Err(ZkMultisigError::InvalidQuorumPercentage);
    }
    Ok(())
}

/// A proposal must deliver something: a positive value, a call, or both.
pub fn validate_content(content: &ProposalContent) -> Result<(), ZkMultisigError> {
    if content.value < 0 {
        return Err(ZkMultisigError::InvalidValue);
    }
    if content.value == 0 && content.call.is_none() {
        return Err(ZkMultisigError::InvalidTarget);
    }
    Ok(())
}

pub struct ProposalStore;

impl ProposalStore {
    pub fn get(env: &Env, proposal_id: &U256) -> Option<ProposalData> {
        env.storage()
            .persistent()
            .get(&DataKey::Proposal(proposal_id.clone()))
    }

    pub fn exists(env: &Env, proposal_id: &U256) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Proposal(proposal_id.clone()))
    }

    pub fn set(env: &Env, proposal_id: &U256, proposal: &ProposalData) {
        env.storage()
            .persistent()
            .set(&DataKey::Proposal(proposal_id.clone()), proposal);
    }

    /// Store a new record and append its id to the enumeration.
    pub fn insert(env: &Env, proposal_id: &U256, proposal: &ProposalData) {
        Self::set(env, proposal_id, proposal);

        let count = Self::count(env);
        env.storage()
            .persistent()
            .set(&DataKey::ProposalAt(count), proposal_id);
        env.storage().instance().set(&PROPOSAL_COUNT, &(count + 1));
    }

    pub fn status(env: &Env, proposal_id: &U256) -> ProposalStatus {
        match Self::get(env, proposal_id) {
            Some(proposal) => proposal.status(env.ledger().timestamp()),
            None => ProposalStatus::None,
        }
    }

    pub fn count(env: &Env) -> u32 {
        env.storage().instance().get(&PROPOSAL_COUNT).unwrap_or(0)
    }

    /// Proposal ids in creation order, `[offset, offset + limit)` clamped.
    pub fn ids(env: &Env, offset: u32, limit: u32) -> Vec<U256> {
        let storage = env.storage().persistent();
        let end = offset.saturating_add(limit).min(Self::count(env));
        let mut ids = Vec::new(env);
        for i in offset..end {
            if let Some(id) = storage.get(&DataKey::ProposalAt(i)) {
                ids.push_back(id);
            }
        }
        ids
    }

    pub fn is_blinder_used(env: &Env, proposal_id: &U256, blinder: &U256) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Blinder(proposal_id.clone(), blinder.clone()))
    }

    pub fn consume_blinder(env: &Env, proposal_id: &U256, blinder: &U256) {
        env.storage()
            .persistent()
            .set(&DataKey::Blinder(proposal_id.clone(), blinder.clone()), &true);
    }
}
