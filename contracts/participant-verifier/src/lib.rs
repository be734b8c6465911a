#![no_std]
//! Groth16 verifier for the multisig participant circuit.
//!
//! Holds a single verification key fixed at deployment. The multisig treats
//! this contract as an opaque capability: it calls `verify_proof` with the
//! proof points and the three public inputs `[blinder, challenge, root]` and
//! only looks at the returned boolean.

use soroban_sdk::{contract, contractimpl, panic_with_error, symbol_short, Env, Symbol, Vec, U256};

pub use zk_multisig_groth16::{Groth16Error, Proof, VerificationKey, PUBLIC_INPUTS};

const VK: Symbol = symbol_short!("vk");

// Typed Events
#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct VerifierInitEvent {
    pub inputs: u32,
}

#[contract]
pub struct ParticipantVerifier;

#[contractimpl]
impl ParticipantVerifier {
    /// Constructor: store the verification key of the participant circuit
    pub fn __constructor(env: Env, vk: VerificationKey) {
        // IC must have exactly one point per public input plus the constant term
        if vk.ic.len() != PUBLIC_INPUTS + 1 {
            panic_with_error!(&env, Groth16Error::IcLengthMismatch);
        }

        env.storage().instance().set(&VK, &vk);

        VerifierInitEvent {
            inputs: PUBLIC_INPUTS,
        }
        .publish(&env);
    }

    /// Verify a participant proof against `[blinder, challenge, root]`.
    /// Never panics on malformed input shape; returns false instead.
    pub fn verify_proof(env: Env, proof: Proof, inputs: Vec<U256>) -> bool {
        if inputs.len() != PUBLIC_INPUTS {
            return false;
        }
        let vk = Self::verification_key(env.clone());
        zk_multisig_groth16::verify_groth16(&env, &vk, &proof, &inputs)
    }

    /// Number of public inputs the circuit expects.
    /// The multisig probes this before accepting a verifier address.
    pub fn inputs_count(_env: Env) -> u32 {
        PUBLIC_INPUTS
    }

    /// Get the stored verification key
    pub fn verification_key(env: Env) -> VerificationKey {
        env.storage()
            .instance()
            .get(&VK)
            .expect("verification key not set")
    }
}
