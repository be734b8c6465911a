use soroban_sdk::{contracttype, symbol_short, Symbol, U256};

pub const QUORUM_PERCENTAGE: Symbol = symbol_short!("quorum");
pub const VERIFIER: Symbol = symbol_short!("verifier");
pub const VALUE_ASSET: Symbol = symbol_short!("asset");
pub const SMT_ROOT: Symbol = symbol_short!("smt_root");
pub const SMT_DEPTH: Symbol = symbol_short!("smt_dpth");
pub const PARTICIPANT_COUNT: Symbol = symbol_short!("part_cnt");
pub const PROPOSAL_COUNT: Symbol = symbol_short!("prop_cnt");
/// Present only while `execute` dispatches a governance command
pub const SELF_CALL: Symbol = symbol_short!("self_call");

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    SmtNode(U256),          // node hash -> SmtNode
    ParticipantAt(u32),     // index -> participant id
    ParticipantIndex(U256), // participant id -> index
    Proposal(U256),         // proposal_id -> ProposalData
    ProposalAt(u32),        // index -> proposal_id
    Blinder(U256, U256),    // (proposal_id, blinder) -> bool
}
