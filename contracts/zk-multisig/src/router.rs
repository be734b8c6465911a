//! Self-governance: the only way to change participants, quorum or verifier.
//!
//! There is no admin. A privileged change is a proposal whose target is this
//! instance; once accepted, `execute` decodes its call into a
//! [`GovernanceCommand`] and dispatches it here with the self-call marker set.
//! The public privileged entry points refuse to run without that marker.

use soroban_sdk::{log, Address, Env, Symbol, TryFromVal, Val, Vec, U256};

use zk_multisig_groth16::{is_in_field, PUBLIC_INPUTS};

use crate::error::ZkMultisigError;
use crate::events::{
    ParticipantsAddedEvent, ParticipantsRemovedEvent, QuorumUpdatedEvent, VerifierUpdatedEvent,
};
use crate::membership::{MembershipSet, MAX_PARTICIPANTS};
use crate::proposal::{validate_quorum_percentage, ProposalCall};
use crate::storage::{QUORUM_PERCENTAGE, SELF_CALL, VERIFIER};
use crate::ZkMultisig;

#[derive(Clone, Debug, PartialEq)]
pub enum GovernanceCommand {
    AddParticipants(Vec<U256>),
    RemoveParticipants(Vec<U256>),
    UpdateQuorumPercentage(u128),
    UpdateParticipantVerifier(Address),
}

impl GovernanceCommand {
    /// Decode a proposal call targeting this instance.
    /// Every command takes exactly one argument.
    pub fn decode(env: &Env, call: &ProposalCall) -> Result<Self, ZkMultisigError> {
        if call.args.len() != 1 {
            return Err(ZkMultisigError::InvalidSelfCall);
        }
        let arg = call.args.get(0).ok_or(ZkMultisigError::InvalidSelfCall)?;

        let func = &call.func;
        if *func == Symbol::new(env, "add_participants") {
            Ok(Self::AddParticipants(decode_arg(env, &arg)?))
        } else if *func == Symbol::new(env, "remove_participants") {
            Ok(Self::RemoveParticipants(decode_arg(env, &arg)?))
        } else if *func == Symbol::new(env, "update_quorum_percentage") {
            Ok(Self::UpdateQuorumPercentage(decode_arg(env, &arg)?))
        } else if *func == Symbol::new(env, "update_participant_verifier") {
            Ok(Self::UpdateParticipantVerifier(decode_arg(env, &arg)?))
        } else {
            Err(ZkMultisigError::InvalidSelfCall)
        }
    }
}

fn decode_arg<T: TryFromVal<Env, Val>>(env: &Env, arg: &Val) -> Result<T, ZkMultisigError> {
    T::try_from_val(env, arg).map_err(|_| ZkMultisigError::InvalidSelfCall)
}

/// Run a command through the public entry point with the self-call marker set.
pub fn dispatch(env: &Env, command: GovernanceCommand) {
    let storage = env.storage().instance();
    storage.set(&SELF_CALL, &true);

    match command {
        GovernanceCommand::AddParticipants(ids) => ZkMultisig::add_participants(env.clone(), ids),
        GovernanceCommand::RemoveParticipants(ids) => {
            ZkMultisig::remove_participants(env.clone(), ids)
        }
        GovernanceCommand::UpdateQuorumPercentage(percentage) => {
            ZkMultisig::update_quorum_percentage(env.clone(), percentage)
        }
        GovernanceCommand::UpdateParticipantVerifier(verifier) => {
            ZkMultisig::update_participant_verifier(env.clone(), verifier)
        }
    }

    storage.remove(&SELF_CALL);
}

pub fn require_self_call(env: &Env) -> Result<(), ZkMultisigError> {
    if env.storage().instance().has(&SELF_CALL) {
        Ok(())
    } else {
        Err(ZkMultisigError::NotSelfCall)
    }
}

pub fn apply(env: &Env, command: GovernanceCommand) -> Result<(), ZkMultisigError> {
    match command {
        GovernanceCommand::AddParticipants(ids) => add_participants(env, &ids),
        GovernanceCommand::RemoveParticipants(ids) => remove_participants(env, &ids),
        GovernanceCommand::UpdateQuorumPercentage(percentage) => {
            if percentage == quorum_percentage(env) {
                return Err(ZkMultisigError::InvalidQuorumPercentage);
            }
            set_quorum_percentage(env, percentage)
        }
        GovernanceCommand::UpdateParticipantVerifier(verifier) => {
            if participant_verifier(env).as_ref() == Some(&verifier) {
                return Err(ZkMultisigError::InvalidVerifier);
            }
            set_participant_verifier(env, verifier)
        }
    }
}

/// Set-union into the participant tree.
/// Capacity is checked against the whole batch before any insert.
pub fn add_participants(env: &Env, ids: &Vec<U256>) -> Result<(), ZkMultisigError> {
    let mut membership = MembershipSet::load(env);

    if membership.len() as u64 + ids.len() as u64 > MAX_PARTICIPANTS as u64 {
        return Err(ZkMultisigError::TooManyParticipants);
    }

    for id in ids.iter() {
        if !is_in_field(env, &id) {
            return Err(ZkMultisigError::SignalNotInField);
        }
        membership.add(&id)?;
    }

    log!(env, "participants added", membership.len());

    ParticipantsAddedEvent {
        participants: ids.clone(),
        new_root: membership.root(),
    }
    .publish(env);
    Ok(())
}

/// Set-difference from the participant tree; at least one must remain.
pub fn remove_participants(env: &Env, ids: &Vec<U256>) -> Result<(), ZkMultisigError> {
    let mut membership = MembershipSet::load(env);

    for id in ids.iter() {
        membership.remove(&id)?;
    }

    if membership.is_empty() {
        return Err(ZkMultisigError::LastParticipant);
    }

    log!(env, "participants removed", membership.len());

    ParticipantsRemovedEvent {
        participants: ids.clone(),
        new_root: membership.root(),
    }
    .publish(env);
    Ok(())
}

pub fn set_quorum_percentage(env: &Env, percentage: u128) -> Result<(), ZkMultisigError> {
    validate_quorum_percentage(percentage)?;

    let old_percentage = quorum_percentage(env);
    env.storage().instance().set(&QUORUM_PERCENTAGE, &percentage);

    QuorumUpdatedEvent {
        old_percentage,
        new_percentage: percentage,
    }
    .publish(env);
    Ok(())
}

pub fn set_participant_verifier(env: &Env, verifier: Address) -> Result<(), ZkMultisigError> {
    if !answers_verifier_probe(env, &verifier) {
        return Err(ZkMultisigError::InvalidVerifier);
    }

    let old_verifier = participant_verifier(env);
    env.storage().instance().set(&VERIFIER, &verifier);

    VerifierUpdatedEvent {
        old_verifier,
        new_verifier: verifier,
    }
    .publish(env);
    Ok(())
}

pub fn quorum_percentage(env: &Env) -> u128 {
    env.storage().instance().get(&QUORUM_PERCENTAGE).unwrap_or(0)
}

pub fn participant_verifier(env: &Env) -> Option<Address> {
    env.storage().instance().get(&VERIFIER)
}

// A deployed verifier for this circuit reports exactly three public inputs.
// Addresses without code, or contracts without the probe, fail the call.
fn answers_verifier_probe(env: &Env, verifier: &Address) -> bool {
    let probe = env.try_invoke_contract::<u32, soroban_sdk::Error>(
        verifier,
        &Symbol::new(env, "inputs_count"),
        Vec::new(env),
    );
    matches!(probe, Ok(Ok(count)) if count == PUBLIC_INPUTS)
}
