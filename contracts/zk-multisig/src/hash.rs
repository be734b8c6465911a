use soroban_sdk::{Bytes, Env, Symbol, Vec, U256};

/// Poseidon over the BN254 scalar field with circomlib parameters.
/// Arity follows `inputs.len()`.
pub fn poseidon(env: &Env, inputs: &Vec<U256>) -> U256 {
    let field = Symbol::new(env, "BN254");
    env.crypto().poseidon_hash(inputs, field)
}

/// keccak256 read back as a big-endian integer.
pub fn keccak_u256(env: &Env, data: &Bytes) -> U256 {
    let digest = env.crypto().keccak256(data).to_array();
    U256::from_be_bytes(env, &Bytes::from_array(env, &digest))
}

/// keccak256 with the top three bits cleared, so the result is < 2^253 < r
/// and can enter a Poseidon permutation without modular reduction.
pub fn keccak_field(env: &Env, data: &Bytes) -> U256 {
    let mut digest = env.crypto().keccak256(data).to_array();
    digest[0] &= 0x1f;
    U256::from_be_bytes(env, &Bytes::from_array(env, &digest))
}
