use soroban_sdk::{xdr::ToXdr, Bytes, Env, U256};

use crate::hash::{keccak_field, keccak_u256, poseidon};
use crate::proposal::ProposalContent;

/// Deterministic proposal id: keccak256 over the XDR encoding of
/// `(content, salt)`.
pub fn proposal_id(env: &Env, content: &ProposalContent, salt: &U256) -> U256 {
    let encoded = (content.clone(), salt.clone()).to_xdr(env);
    keccak_u256(env, &encoded)
}

/// Challenge a vote proof must commit to.
///
/// Binds the proof to this network, this instance and this proposal:
/// `Poseidon(keccak256(network_id ‖ xdr(instance) ‖ be32(proposal_id)))`,
/// with the digest trimmed into the scalar field before hashing.
pub fn proposal_challenge(env: &Env, proposal_id: &U256) -> U256 {
    let mut data = Bytes::from_array(env, &env.ledger().network_id().to_array());
    data.append(&env.current_contract_address().to_xdr(env));
    data.append(&proposal_id.to_be_bytes());

    let inputs = soroban_sdk::vec![env, keccak_field(env, &data)];
    poseidon(env, &inputs)
}
