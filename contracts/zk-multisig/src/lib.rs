//! # ZK Multisig
//!
//! Anonymous multi-party governance. Participants are opaque field elements
//! held in a sparse Merkle tree; every vote is a Groth16 proof of membership
//! that reveals only a one-time blinder.
//!
//! ## Vote binding
//!
//! A proof carries three public inputs `[blinder, challenge, root]`:
//! - the **blinder** may be used once per proposal (anti-replay),
//! - the **challenge** is derived from the network id, this instance and the
//!   proposal id, so a proof cannot be replayed on another proposal, instance
//!   or network,
//! - the **root** must be the participant root at the moment the vote is
//!   checked; any membership change forces voters to regenerate proofs.
//!
//! ## Self-governance
//!
//! Participant changes, quorum changes and verifier changes are proposals
//! whose target is the instance itself. They go through the same
//! create/vote/quorum path as any external action.

#![no_std]
use soroban_sdk::{
    contract, contractimpl, log, panic_with_error, token, Address, Env, Val, Vec, U256,
};

mod challenge;
mod error;
mod events;
mod hash;
mod membership;
mod proposal;
mod router;
mod storage;
mod validator;

pub use error::ZkMultisigError;
pub use events::*;
pub use membership::{SmtNode, SmtProof, MAX_PARTICIPANTS, SMT_MAX_DEPTH};
pub use proposal::{
    required_quorum, ProposalCall, ProposalContent, ProposalInfoView, ProposalStatus,
    PERCENTAGE_100,
};
pub use validator::ZkParams;
pub use zk_multisig_groth16::Proof;

use membership::MembershipSet;
use proposal::{validate_content, ProposalData, ProposalStore};
use router::GovernanceCommand;
use storage::{SMT_DEPTH, VALUE_ASSET};

#[contract]
pub struct ZkMultisig;

#[contractimpl]
impl ZkMultisig {
    /// One-time setup: participants, quorum percentage, verifier and the token
    /// used to move proposal values.
    pub fn initialize(
        env: Env,
        participants: Vec<U256>,
        quorum_percentage: u128,
        participant_verifier: Address,
        value_asset: Address,
    ) {
        if env.storage().instance().has(&SMT_DEPTH) {
            panic_with_error!(&env, ZkMultisigError::AlreadyInitialized);
        }
        if participants.is_empty() {
            panic_with_error!(&env, ZkMultisigError::EmptyParticipants);
        }

        MembershipSet::initialize(&env, SMT_MAX_DEPTH);
        env.storage().instance().set(&VALUE_ASSET, &value_asset);

        or_panic(&env, router::set_quorum_percentage(&env, quorum_percentage));
        or_panic(
            &env,
            router::set_participant_verifier(&env, participant_verifier.clone()),
        );
        or_panic(&env, router::add_participants(&env, &participants));

        InitializedEvent {
            participants: participants.len(),
            quorum_percentage,
            verifier: participant_verifier,
        }
        .publish(&env);
    }

    // ---- self-only entry points (reachable through `execute`) ----

    pub fn add_participants(env: Env, participants: Vec<U256>) {
        or_panic(&env, router::require_self_call(&env));
        or_panic(
            &env,
            router::apply(&env, GovernanceCommand::AddParticipants(participants)),
        );
    }

    pub fn remove_participants(env: Env, participants: Vec<U256>) {
        or_panic(&env, router::require_self_call(&env));
        or_panic(
            &env,
            router::apply(&env, GovernanceCommand::RemoveParticipants(participants)),
        );
    }

    pub fn update_quorum_percentage(env: Env, quorum_percentage: u128) {
        or_panic(&env, router::require_self_call(&env));
        or_panic(
            &env,
            router::apply(
                &env,
                GovernanceCommand::UpdateQuorumPercentage(quorum_percentage),
            ),
        );
    }

    pub fn update_participant_verifier(env: Env, participant_verifier: Address) {
        or_panic(&env, router::require_self_call(&env));
        or_panic(
            &env,
            router::apply(
                &env,
                GovernanceCommand::UpdateParticipantVerifier(participant_verifier),
            ),
        );
    }

    // ---- proposals ----

    /// Create a proposal and cast the creator's vote with `zk_params`.
    /// Quorum is fixed here from the current participant count.
    pub fn create(
        env: Env,
        content: ProposalContent,
        duration: u64,
        salt: U256,
        zk_params: ZkParams,
    ) -> U256 {
        if duration == 0 {
            panic_with_error!(&env, ZkMultisigError::InvalidDuration);
        }
        or_panic(&env, validate_content(&content));

        let proposal_id = challenge::proposal_id(&env, &content, &salt);
        if ProposalStore::exists(&env, &proposal_id) {
            panic_with_error!(&env, ZkMultisigError::ProposalExists);
        }

        let proposal_end_time = env
            .ledger()
            .timestamp()
            .checked_add(duration)
            .unwrap_or_else(|| panic_with_error!(&env, ZkMultisigError::InvalidDuration));

        let membership = MembershipSet::load(&env);
        let proposal = ProposalData {
            content: content.clone(),
            proposal_end_time,
            required_quorum: required_quorum(membership.len(), router::quorum_percentage(&env)),
            blinders_count: 0,
            executed: false,
        };
        ProposalStore::insert(&env, &proposal_id, &proposal);

        ProposalCreatedEvent {
            proposal_id: proposal_id.clone(),
            content,
        }
        .publish(&env);

        Self::cast_vote(&env, &proposal_id, &zk_params, &membership);

        proposal_id
    }

    /// Vote on a proposal that is still in `Voting`.
    pub fn vote(env: Env, proposal_id: U256, zk_params: ZkParams) {
        let membership = MembershipSet::load(&env);
        Self::cast_vote(&env, &proposal_id, &zk_params, &membership);
    }

    /// Execute an accepted proposal.
    ///
    /// `value` must equal the proposal's value; when positive it is moved from
    /// `payer` to the target in the value asset before the call is made.
    pub fn execute(env: Env, proposal_id: U256, value: i128, payer: Option<Address>) {
        let mut proposal = ProposalStore::get(&env, &proposal_id)
            .unwrap_or_else(|| panic_with_error!(&env, ZkMultisigError::NotAccepted));

        if proposal.status(env.ledger().timestamp()) != ProposalStatus::Accepted {
            panic_with_error!(&env, ZkMultisigError::NotAccepted);
        }
        if value != proposal.content.value {
            panic_with_error!(&env, ZkMultisigError::ValueMismatch);
        }
        if value > 0 && payer.is_none() {
            panic_with_error!(&env, ZkMultisigError::MissingPayer);
        }

        // Flag is persisted before any external interaction
        proposal.executed = true;
        ProposalStore::set(&env, &proposal_id, &proposal);

        let content = proposal.content;

        if let Some(payer) = payer.filter(|_| value > 0) {
            let asset: Address = env
                .storage()
                .instance()
                .get(&VALUE_ASSET)
                .unwrap_or_else(|| panic_with_error!(&env, ZkMultisigError::NotInitialized));
            token::TokenClient::new(&env, &asset).transfer(&payer, &content.target, &value);
        }

        if let Some(call) = content.call {
            if content.target == env.current_contract_address() {
                let command = or_panic(&env, GovernanceCommand::decode(&env, &call));
                router::dispatch(&env, command);
            } else {
                let result = env.try_invoke_contract::<Val, soroban_sdk::Error>(
                    &content.target,
                    &call.func,
                    call.args,
                );
                if !matches!(result, Ok(Ok(_))) {
                    panic_with_error!(&env, ZkMultisigError::DispatchFailed);
                }
            }
        }

        log!(&env, "proposal executed", proposal_id);

        ProposalExecutedEvent { proposal_id }.publish(&env);
    }

    // ---- views ----

    pub fn get_participants_smt_root(env: Env) -> U256 {
        MembershipSet::load(&env).root()
    }

    pub fn get_participants_smt_proof(env: Env, participant: U256) -> SmtProof {
        MembershipSet::load(&env).proof(&participant)
    }

    pub fn get_participants(env: Env) -> Vec<U256> {
        MembershipSet::load(&env).participants()
    }

    pub fn get_participants_count(env: Env) -> u32 {
        MembershipSet::load(&env).len()
    }

    pub fn is_participant(env: Env, participant: U256) -> bool {
        MembershipSet::load(&env).contains(&participant)
    }

    pub fn get_proposals_count(env: Env) -> u32 {
        ProposalStore::count(&env)
    }

    pub fn get_proposals(env: Env, offset: u32, limit: u32) -> Vec<U256> {
        ProposalStore::ids(&env, offset, limit)
    }

    pub fn get_proposal_info(env: Env, proposal_id: U256) -> ProposalInfoView {
        let proposal = ProposalStore::get(&env, &proposal_id)
            .unwrap_or_else(|| panic_with_error!(&env, ZkMultisigError::ProposalNotFound));
        let status = proposal.status(env.ledger().timestamp());

        ProposalInfoView {
            content: proposal.content,
            proposal_end_time: proposal.proposal_end_time,
            status,
            votes_count: proposal.blinders_count,
            required_quorum: proposal.required_quorum,
        }
    }

    pub fn get_proposal_status(env: Env, proposal_id: U256) -> ProposalStatus {
        ProposalStore::status(&env, &proposal_id)
    }

    /// Challenge a vote proof for `proposal_id` must carry as input[1].
    /// Defined for ids that do not exist yet, so creators can prove first.
    pub fn get_proposal_challenge(env: Env, proposal_id: U256) -> U256 {
        challenge::proposal_challenge(&env, &proposal_id)
    }

    pub fn compute_proposal_id(env: Env, content: ProposalContent, salt: U256) -> U256 {
        challenge::proposal_id(&env, &content, &salt)
    }

    pub fn get_quorum_percentage(env: Env) -> u128 {
        router::quorum_percentage(&env)
    }

    pub fn get_participant_verifier(env: Env) -> Address {
        router::participant_verifier(&env)
            .unwrap_or_else(|| panic_with_error!(&env, ZkMultisigError::NotInitialized))
    }

    pub fn get_value_asset(env: Env) -> Address {
        env.storage()
            .instance()
            .get(&VALUE_ASSET)
            .unwrap_or_else(|| panic_with_error!(&env, ZkMultisigError::NotInitialized))
    }

    pub fn is_blinder_voted(env: Env, proposal_id: U256, blinder: U256) -> bool {
        ProposalStore::is_blinder_used(&env, &proposal_id, &blinder)
    }

    // Internal: validate and record one vote
    fn cast_vote(env: &Env, proposal_id: &U256, zk_params: &ZkParams, membership: &MembershipSet) {
        let mut proposal = ProposalStore::get(env, proposal_id)
            .unwrap_or_else(|| panic_with_error!(env, ZkMultisigError::NotVoting));

        let now = env.ledger().timestamp();
        if proposal.status(now) != ProposalStatus::Voting {
            panic_with_error!(env, ZkMultisigError::NotVoting);
        }

        let verifier = router::participant_verifier(env)
            .unwrap_or_else(|| panic_with_error!(env, ZkMultisigError::NotInitialized));
        let blinder = or_panic(
            env,
            validator::validate(env, proposal_id, zk_params, membership, &verifier),
        );

        ProposalStore::consume_blinder(env, proposal_id, &blinder);
        proposal.blinders_count += 1;
        ProposalStore::set(env, proposal_id, &proposal);

        if proposal.status(now) == ProposalStatus::Accepted {
            log!(env, "proposal accepted", proposal_id.clone());
        }

        ProposalVotedEvent {
            proposal_id: proposal_id.clone(),
            blinder,
        }
        .publish(env);
    }
}

fn or_panic<T>(env: &Env, result: Result<T, ZkMultisigError>) -> T {
    result.unwrap_or_else(|error| panic_with_error!(env, error))
}
