//! # ZK Multisig Groth16 Library
//!
//! Proof types and Groth16 verification shared by the participant verifier and
//! the multisig contract. Uses the BN254 elliptic curve (alt_bn128) host
//! functions for the pairing check.
//!
//! ## Cryptographic Primitives
//!
//! ### BN254 Curve (alt_bn128)
//! - **Definition**: y² = x³ + 3 over 𝔽_p where p = 21888242871839275222246405745257275088696311157297823662689037894645226208583
//! - **Scalar field order**: r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
//!
//! ### Groth16 SNARK
//! - **Paper**: "On the Size of Pairing-based Non-interactive Arguments" by Jens Groth (2016)
//! - **Public inputs**: the multisig circuit exposes exactly three signals,
//!   `[blinder, challenge, membership root]`.

#![no_std]

use soroban_sdk::{
    contracterror, contracttype,
    crypto::bn254::{Fr, G1Affine, G2Affine},
    Bytes, BytesN, Env, Vec, U256,
};

/// Number of public inputs of the participant circuit: blinder, challenge, root.
pub const PUBLIC_INPUTS: u32 = 3;

/// BN254 scalar field modulus (Fr) in big-endian bytes
/// r = 21888242871839275222246405745257275088548364400416034343698204186575808495617
/// All public signals (blinder, challenge, root) and participant ids must be < r
pub const BN254_FR_MODULUS: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x01,
];

/// BN254 scalar field order minus one (r - 1) in big-endian bytes
/// Used for G1 point negation: (r-1) * P = -P since (r-1) ≡ -1 (mod r)
const BN254_R_MINUS_ONE: [u8; 32] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58, 0x5d,
    0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00, 0x00, 0x00,
];

#[contracterror]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Groth16Error {
    /// IC vector length doesn't match public signals + 1
    IcLengthMismatch = 30,
    /// Public signal value >= BN254 scalar field modulus (invalid field element)
    SignalNotInField = 31,
}

/// Groth16 Verification Key for BN254
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct VerificationKey {
    pub alpha: BytesN<64>,   // G1 point
    pub beta: BytesN<128>,   // G2 point
    pub gamma: BytesN<128>,  // G2 point
    pub delta: BytesN<128>,  // G2 point
    pub ic: Vec<BytesN<64>>, // IC points (G1)
}

/// Groth16 Proof
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct Proof {
    pub a: BytesN<64>,  // G1 point
    pub b: BytesN<128>, // G2 point
    pub c: BytesN<64>,  // G1 point
}

/// Validate that a U256 value is within the BN254 scalar field (< r)
///
/// Values >= r are reduced mod r inside the circuit, so an attacker could
/// submit blinder `b + r` and have it verify like `b` while being stored under
/// a different key. Every public signal MUST pass this check before it is used
/// as an anti-replay key.
pub fn assert_in_field(env: &Env, value: &U256) -> Result<(), Groth16Error> {
    if !is_in_field(env, value) {
        return Err(Groth16Error::SignalNotInField);
    }
    Ok(())
}

/// Check if a U256 value is within the BN254 scalar field (< r)
pub fn is_in_field(env: &Env, value: &U256) -> bool {
    value < &field_modulus(env)
}

/// Check every signal of a public input vector against the field modulus.
pub fn assert_signals_in_field(env: &Env, signals: &Vec<U256>) -> Result<(), Groth16Error> {
    let modulus = field_modulus(env);
    for signal in signals.iter() {
        if signal >= modulus {
            return Err(Groth16Error::SignalNotInField);
        }
    }
    Ok(())
}

/// The scalar field modulus r as a U256.
pub fn field_modulus(env: &Env) -> U256 {
    U256::from_be_bytes(env, &Bytes::from_array(env, &BN254_FR_MODULUS))
}

/// Verify a Groth16 proof using BN254 pairing check.
///
/// The Groth16 verification equation is:
/// e(-A, B) * e(alpha, beta) * e(vk_x, gamma) * e(C, delta) = 1
///
/// Where vk_x = IC[0] + sum(pub_signals[i] * IC[i+1])
///
/// Returns `false` when the IC length does not match the signal count or a
/// signal is outside the scalar field, without touching the host pairing.
pub fn verify_groth16(
    env: &Env,
    vk: &VerificationKey,
    proof: &Proof,
    pub_signals: &Vec<U256>,
) -> bool {
    if pub_signals.len() + 1 != vk.ic.len() {
        return false;
    }
    if assert_signals_in_field(env, pub_signals).is_err() {
        return false;
    }

    let vk_x = match compute_vk_x(vk, pub_signals) {
        Some(point) => point,
        None => return false,
    };

    // (r-1) * A = -A
    let a_point = G1Affine::from_bytes(proof.a.clone());
    let neg_a = a_point * neg_one_scalar(env);

    let mut g1_vec = Vec::new(env);
    g1_vec.push_back(neg_a);
    g1_vec.push_back(G1Affine::from_bytes(vk.alpha.clone()));
    g1_vec.push_back(vk_x);
    g1_vec.push_back(G1Affine::from_bytes(proof.c.clone()));

    let mut g2_vec = Vec::new(env);
    g2_vec.push_back(G2Affine::from_bytes(proof.b.clone()));
    g2_vec.push_back(G2Affine::from_bytes(vk.beta.clone()));
    g2_vec.push_back(G2Affine::from_bytes(vk.gamma.clone()));
    g2_vec.push_back(G2Affine::from_bytes(vk.delta.clone()));

    env.crypto().bn254().pairing_check(g1_vec, g2_vec)
}

/// Returns the scalar (r - 1) which is equivalent to -1 mod r.
fn neg_one_scalar(env: &Env) -> Fr {
    let bytes = Bytes::from_array(env, &BN254_R_MINUS_ONE);
    Fr::from(U256::from_be_bytes(env, &bytes))
}

/// Compute vk_x = IC[0] + sum(pub_signals[i] * IC[i+1])
///
/// Callers have already checked `ic.len() == pub_signals.len() + 1`.
fn compute_vk_x(vk: &VerificationKey, pub_signals: &Vec<U256>) -> Option<G1Affine> {
    let mut ic = vk.ic.iter();
    let mut vk_x = G1Affine::from_bytes(ic.next()?);

    for (signal, ic_point) in pub_signals.iter().zip(ic) {
        vk_x = vk_x + G1Affine::from_bytes(ic_point) * Fr::from(signal);
    }

    Some(vk_x)
}
