use soroban_sdk::{contracttype, Address, Env, IntoVal, Symbol, Vec, U256};

use zk_multisig_groth16::{assert_signals_in_field, Proof, PUBLIC_INPUTS};

use crate::challenge::proposal_challenge;
use crate::error::ZkMultisigError;
use crate::membership::MembershipSet;
use crate::proposal::ProposalStore;

/// Proof plus public inputs `[blinder, challenge, root]`
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct ZkParams {
    pub proof: Proof,
    pub inputs: Vec<U256>,
}

/// Gate for every vote, including the creator's implicit one.
///
/// Checks run cheapest first and stop at the first failure:
/// input shape, blinder replay, challenge, root freshness, then the
/// verifier capability.
pub fn validate(
    env: &Env,
    proposal_id: &U256,
    params: &ZkParams,
    membership: &MembershipSet,
    verifier: &Address,
) -> Result<U256, ZkMultisigError> {
    if params.inputs.len() != PUBLIC_INPUTS {
        return Err(ZkMultisigError::InvalidPublicInputs);
    }
    // Aliased signals (x + r) would bypass the blinder replay check
    assert_signals_in_field(env, &params.inputs)
        .map_err(|_| ZkMultisigError::SignalNotInField)?;

    let blinder = params
        .inputs
        .get(0)
        .ok_or(ZkMultisigError::InvalidPublicInputs)?;
    let challenge = params
        .inputs
        .get(1)
        .ok_or(ZkMultisigError::InvalidPublicInputs)?;
    let root = params
        .inputs
        .get(2)
        .ok_or(ZkMultisigError::InvalidPublicInputs)?;

    if ProposalStore::is_blinder_used(env, proposal_id, &blinder) {
        return Err(ZkMultisigError::BlinderAlreadyUsed);
    }

    if challenge != proposal_challenge(env, proposal_id) {
        return Err(ZkMultisigError::ChallengeMismatch);
    }

    // Root at validation time, not at proposal creation: any membership
    // change invalidates proofs still in flight
    if root != membership.root() {
        return Err(ZkMultisigError::RootMismatch);
    }

    // A trapping verifier (off-curve point, missing vk) rejects like `false`
    let verified = env.try_invoke_contract::<bool, soroban_sdk::Error>(
        verifier,
        &Symbol::new(env, "verify_proof"),
        soroban_sdk::vec![
            env,
            params.proof.clone().into_val(env),
            params.inputs.clone().into_val(env)
        ],
    );
    if !matches!(verified, Ok(Ok(true))) {
        return Err(ZkMultisigError::ProofRejected);
    }

    Ok(blinder)
}
