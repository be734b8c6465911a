use soroban_sdk::{Address, Vec, U256};

use crate::proposal::ProposalContent;

// Typed Events
#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct InitializedEvent {
    pub participants: u32,
    pub quorum_percentage: u128,
    pub verifier: Address,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalCreatedEvent {
    #[topic]
    pub proposal_id: U256,
    pub content: ProposalContent,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalVotedEvent {
    #[topic]
    pub proposal_id: U256,
    pub blinder: U256,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct ProposalExecutedEvent {
    #[topic]
    pub proposal_id: U256,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantsAddedEvent {
    pub participants: Vec<U256>,
    pub new_root: U256,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct ParticipantsRemovedEvent {
    pub participants: Vec<U256>,
    pub new_root: U256,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct QuorumUpdatedEvent {
    pub old_percentage: u128,
    pub new_percentage: u128,
}

#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct VerifierUpdatedEvent {
    pub old_verifier: Option<Address>,
    pub new_verifier: Address,
}
