#![cfg(feature = "wasm-tests")]

// Factory deployment against the release wasm of the multisig.
// Build first: `stellar contract build`, then
// `cargo test -p zk-multisig-integration-tests --features wasm-tests`.

use soroban_sdk::{testutils::Address as _, Address, BytesN, Env, Vec, U256};

use zk_multisig_factory::{ZkMultisigFactory, ZkMultisigFactoryClient};

mod zk_multisig_wasm {
    soroban_sdk::contractimport!(file = "../../target/wasm32v1-none/release/zk_multisig.wasm");
}

mod accepting_verifier {
    use soroban_sdk::{contract, contractimpl, Env, Vec, U256};
    use zk_multisig_groth16::Proof;

    #[contract]
    pub struct AcceptingVerifier;

    #[contractimpl]
    impl AcceptingVerifier {
        pub fn verify_proof(_env: Env, _proof: Proof, _inputs: Vec<U256>) -> bool {
            true
        }

        pub fn inputs_count(_env: Env) -> u32 {
            3
        }
    }
}

const PERCENTAGE_50: u128 = 500_000_000_000_000_000_000_000_000;

struct Deployment {
    env: Env,
    factory: ZkMultisigFactoryClient<'static>,
    verifier: Address,
    asset: Address,
}

fn setup() -> Deployment {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();

    let wasm_hash = env.deployer().upload_contract_wasm(zk_multisig_wasm::WASM);
    let factory_id = env.register(ZkMultisigFactory, (wasm_hash,));
    let factory = ZkMultisigFactoryClient::new(&env, &factory_id);

    let verifier = env.register(accepting_verifier::AcceptingVerifier, ());
    let asset = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    Deployment {
        env,
        factory,
        verifier,
        asset,
    }
}

fn participants(env: &Env) -> Vec<U256> {
    Vec::from_array(
        env,
        [
            U256::from_u32(env, 11),
            U256::from_u32(env, 22),
            U256::from_u32(env, 33),
        ],
    )
}

#[test]
fn test_create_multisig_lands_on_predicted_address() {
    let d = setup();
    let deployer = Address::generate(&d.env);
    let salt = BytesN::from_array(&d.env, &[1u8; 32]);

    let predicted = d.factory.compute_multisig_address(&deployer, &salt);
    let multisig = d.factory.create_multisig(
        &deployer,
        &salt,
        &participants(&d.env),
        &PERCENTAGE_50,
        &d.verifier,
        &d.asset,
    );

    assert_eq!(multisig, predicted);
    assert!(d.factory.is_multisig(&multisig));
    assert_eq!(d.factory.multisigs_count(), 1);
    assert_eq!(d.factory.multisigs(&0, &10), Vec::from_array(&d.env, [multisig.clone()]));

    // Initialized in the same transaction
    let instance = zk_multisig_wasm::Client::new(&d.env, &multisig);
    assert_eq!(instance.get_participants_count(), 3);
    assert_eq!(instance.get_quorum_percentage(), PERCENTAGE_50);
    assert_eq!(instance.get_participant_verifier(), d.verifier);
    assert_eq!(instance.get_value_asset(), d.asset);
}

#[test]
fn test_each_deployer_gets_its_own_instance() {
    let d = setup();
    let salt = BytesN::from_array(&d.env, &[5u8; 32]);

    let first = d.factory.create_multisig(
        &Address::generate(&d.env),
        &salt,
        &participants(&d.env),
        &PERCENTAGE_50,
        &d.verifier,
        &d.asset,
    );
    let second = d.factory.create_multisig(
        &Address::generate(&d.env),
        &salt,
        &participants(&d.env),
        &PERCENTAGE_50,
        &d.verifier,
        &d.asset,
    );

    assert_ne!(first, second);
    assert_eq!(d.factory.multisigs_count(), 2);
    assert_eq!(d.factory.multisigs(&1, &10), Vec::from_array(&d.env, [second.clone()]));

    // Same participants, different instances: challenges differ
    let id = U256::from_u32(&d.env, 1);
    assert_ne!(
        zk_multisig_wasm::Client::new(&d.env, &first).get_proposal_challenge(&id),
        zk_multisig_wasm::Client::new(&d.env, &second).get_proposal_challenge(&id)
    );
}

#[test]
#[should_panic(expected = "Error(Contract, #1)")]
fn test_salt_reuse_fails() {
    let d = setup();
    let deployer = Address::generate(&d.env);
    let salt = BytesN::from_array(&d.env, &[9u8; 32]);

    for _ in 0..2 {
        d.factory.create_multisig(
            &deployer,
            &salt,
            &participants(&d.env),
            &PERCENTAGE_50,
            &d.verifier,
            &d.asset,
        );
    }
}

#[test]
#[should_panic(expected = "Error(Contract, #8)")]
fn test_create_multisig_without_participants_fails() {
    let d = setup();
    d.factory.create_multisig(
        &Address::generate(&d.env),
        &BytesN::from_array(&d.env, &[2u8; 32]),
        &Vec::new(&d.env),
        &PERCENTAGE_50,
        &d.verifier,
        &d.asset,
    );
}
