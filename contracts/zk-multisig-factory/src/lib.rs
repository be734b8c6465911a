#![no_std]
//! Deploys multisig instances at predictable addresses and keeps a registry
//! of everything it deployed.
//!
//! Also publishes the typed message participants sign to derive their
//! per-instance identity secret off chain (EIP-712 layout, keccak256).

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error, symbol_short,
    xdr::ToXdr, Address, Bytes, BytesN, Env, IntoVal, Symbol, Val, Vec, U256,
};

const WASM_HASH: Symbol = symbol_short!("wasm");
const MULTISIG_COUNT: Symbol = symbol_short!("ms_cnt");

const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";
const KDF_TYPE: &str = "KDF(address zkMultisigAddress)";
const DOMAIN_NAME: &str = "ZKMultisigFactory";
const DOMAIN_VERSION: &str = "1";

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Multisig(Address), // address -> deployed here
    MultisigAt(u32),   // index -> address
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum FactoryError {
    /// An instance already lives at the derived address
    AlreadyInitialized = 1,
    /// Pagination offset past the end of the registry
    InvalidRange = 2,
}

// Typed Events
#[soroban_sdk::contractevent]
#[derive(Clone, Debug, PartialEq)]
pub struct MultisigCreatedEvent {
    #[topic]
    pub multisig: Address,
    pub participants: Vec<U256>,
    pub quorum_percentage: u128,
}

#[contract]
pub struct ZkMultisigFactory;

#[contractimpl]
impl ZkMultisigFactory {
    /// Constructor: pin the wasm every instance is deployed from
    pub fn __constructor(env: Env, multisig_wasm_hash: BytesN<32>) {
        env.storage().instance().set(&WASM_HASH, &multisig_wasm_hash);
    }

    /// Deploy and initialize a multisig in one transaction.
    /// The address depends only on `deployer` and `salt`.
    pub fn create_multisig(
        env: Env,
        deployer: Address,
        salt: BytesN<32>,
        participants: Vec<U256>,
        quorum_percentage: u128,
        participant_verifier: Address,
        value_asset: Address,
    ) -> Address {
        deployer.require_auth();

        let deploy_salt = Self::deploy_salt(&env, &deployer, &salt);
        let predicted = env
            .deployer()
            .with_current_contract(deploy_salt.clone())
            .deployed_address();
        if Self::is_multisig(env.clone(), predicted) {
            panic_with_error!(&env, FactoryError::AlreadyInitialized);
        }

        let multisig = env
            .deployer()
            .with_current_contract(deploy_salt)
            .deploy_v2(Self::multisig_wasm_hash(env.clone()), ());

        let init_args: Vec<Val> = soroban_sdk::vec![
            &env,
            participants.clone().into_val(&env),
            quorum_percentage.into_val(&env),
            participant_verifier.into_val(&env),
            value_asset.into_val(&env),
        ];
        env.invoke_contract::<()>(&multisig, &Symbol::new(&env, "initialize"), init_args);

        let count = Self::multisigs_count(env.clone());
        let storage = env.storage().persistent();
        storage.set(&DataKey::Multisig(multisig.clone()), &true);
        storage.set(&DataKey::MultisigAt(count), &multisig);
        env.storage().instance().set(&MULTISIG_COUNT, &(count + 1));

        MultisigCreatedEvent {
            multisig: multisig.clone(),
            participants,
            quorum_percentage,
        }
        .publish(&env);

        multisig
    }

    /// Address `create_multisig` would produce for this deployer and salt
    pub fn compute_multisig_address(env: Env, deployer: Address, salt: BytesN<32>) -> Address {
        let deploy_salt = Self::deploy_salt(&env, &deployer, &salt);
        env.deployer()
            .with_current_contract(deploy_salt)
            .deployed_address()
    }

    pub fn is_multisig(env: Env, multisig: Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Multisig(multisig))
    }

    pub fn multisigs_count(env: Env) -> u32 {
        env.storage().instance().get(&MULTISIG_COUNT).unwrap_or(0)
    }

    /// Deployed instances in creation order
    pub fn multisigs(env: Env, offset: u32, limit: u32) -> Vec<Address> {
        let count = Self::multisigs_count(env.clone());
        if offset > count {
            panic_with_error!(&env, FactoryError::InvalidRange);
        }

        let storage = env.storage().persistent();
        let end = offset.saturating_add(limit).min(count);
        let mut multisigs = Vec::new(&env);
        for i in offset..end {
            if let Some(multisig) = storage.get(&DataKey::MultisigAt(i)) {
                multisigs.push_back(multisig);
            }
        }
        multisigs
    }

    pub fn multisig_wasm_hash(env: Env) -> BytesN<32> {
        env.storage()
            .instance()
            .get(&WASM_HASH)
            .expect("wasm hash not set")
    }

    /// Message a participant signs to derive their identity for `multisig`
    pub fn kdf_msg_to_sign(env: Env, multisig: Address) -> BytesN<32> {
        let word = address_word(&env, &multisig);
        typed_message(&env, &word)
    }

    /// Same message with a zero address, for identities not bound to an
    /// instance yet
    pub fn default_kdf_msg_to_sign(env: Env) -> BytesN<32> {
        typed_message(&env, &[0u8; 32])
    }

    pub fn kdf_domain_separator(env: Env) -> BytesN<32> {
        BytesN::from_array(&env, &domain_separator(&env))
    }

    // Internal helpers

    fn deploy_salt(env: &Env, deployer: &Address, salt: &BytesN<32>) -> BytesN<32> {
        let mut data = deployer.clone().to_xdr(env);
        data.extend_from_array(&salt.to_array());
        BytesN::from_array(env, &keccak(env, &data))
    }
}

fn keccak(env: &Env, data: &Bytes) -> [u8; 32] {
    env.crypto().keccak256(data).to_array()
}

fn keccak_str(env: &Env, value: &str) -> [u8; 32] {
    keccak(env, &Bytes::from_slice(env, value.as_bytes()))
}

// Soroban addresses do not fit an EVM word; they enter as keccak256(xdr)
fn address_word(env: &Env, address: &Address) -> [u8; 32] {
    keccak(env, &address.clone().to_xdr(env))
}

fn domain_separator(env: &Env) -> [u8; 32] {
    let mut data = Bytes::new(env);
    data.extend_from_array(&keccak_str(env, EIP712_DOMAIN_TYPE));
    data.extend_from_array(&keccak_str(env, DOMAIN_NAME));
    data.extend_from_array(&keccak_str(env, DOMAIN_VERSION));
    data.extend_from_array(&env.ledger().network_id().to_array());
    data.extend_from_array(&address_word(env, &env.current_contract_address()));
    keccak(env, &data)
}

// keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ keccak256(typeHash ‖ word))
fn typed_message(env: &Env, multisig_word: &[u8; 32]) -> BytesN<32> {
    let mut body = Bytes::new(env);
    body.extend_from_array(&keccak_str(env, KDF_TYPE));
    body.extend_from_array(multisig_word);
    let struct_hash = keccak(env, &body);

    let mut data = Bytes::from_array(env, &[0x19, 0x01]);
    data.extend_from_array(&domain_separator(env));
    data.extend_from_array(&struct_hash);
    BytesN::from_array(env, &keccak(env, &data))
}
