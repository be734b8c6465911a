#![no_std]

// Integration test crate - all code is test-only

#[cfg(test)]
mod tests {
    extern crate std;
    use num_bigint::BigUint;
    use soroban_sdk::{
        testutils::{Address as _, Ledger as _},
        token::{StellarAssetClient, TokenClient},
        Address, Bytes, BytesN, Env, IntoVal, Symbol, Val, Vec, U256,
    };

    use participant_verifier::ParticipantVerifier;
    use zk_multisig::{
        ProposalCall, ProposalContent, ProposalStatus, ZkMultisig, ZkMultisigClient,
        ZkMultisigError, ZkParams, PERCENTAGE_100,
    };
    use zk_multisig_groth16::{Proof, VerificationKey};

    // Verifier stand-in that accepts every proof
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

    mod counter {
        use soroban_sdk::{contract, contractimpl, symbol_short, Env, Symbol};

        const COUNT: Symbol = symbol_short!("count");

        #[contract]
        pub struct Counter;

        #[contractimpl]
        impl Counter {
            pub fn increment(env: Env, by: u32) -> u32 {
                let count: u32 = env.storage().instance().get(&COUNT).unwrap_or(0) + by;
                env.storage().instance().set(&COUNT, &count);
                count
            }

            pub fn count(env: Env) -> u32 {
                env.storage().instance().get(&COUNT).unwrap_or(0)
            }
        }
    }

    /// Multisig instance, both verifiers, a counter target and a value asset
    struct MultisigSystem {
        env: Env,
        multisig: Address,
        accepting_verifier: Address,
        real_verifier: Address,
        counter: Address,
        asset: Address,
    }

    impl MultisigSystem {
        fn new() -> Self {
            let env = Env::default();
            env.mock_all_auths_allowing_non_root_auth();
            env.cost_estimate().budget().reset_unlimited();
            env.ledger().with_mut(|li| li.timestamp = 1_000);

            let accepting_verifier = env.register(accepting_verifier::AcceptingVerifier, ());
            let real_verifier = env.register(ParticipantVerifier, (test_vk(&env),));
            let counter = env.register(counter::Counter, ());
            let asset = env
                .register_stellar_asset_contract_v2(Address::generate(&env))
                .address();
            let multisig = env.register(ZkMultisig, ());

            Self {
                env,
                multisig,
                accepting_verifier,
                real_verifier,
                counter,
                asset,
            }
        }

        fn client(&self) -> ZkMultisigClient {
            ZkMultisigClient::new(&self.env, &self.multisig)
        }

        fn init(&self, participants: u32, percent: u128, verifier: &Address) {
            self.client().initialize(
                &ids(&self.env, 1, participants),
                &(percent * PERCENTAGE_100 / 100),
                verifier,
                &self.asset,
            );
        }

        fn params(&self, client: &ZkMultisigClient, proposal_id: &U256, blinder: u32) -> ZkParams {
            ZkParams {
                proof: test_proof(&self.env),
                inputs: Vec::from_array(
                    &self.env,
                    [
                        U256::from_u32(&self.env, blinder),
                        client.get_proposal_challenge(proposal_id),
                        client.get_participants_smt_root(),
                    ],
                ),
            }
        }

        fn propose(&self, content: &ProposalContent, salt: u32, blinder: u32) -> U256 {
            let client = self.client();
            let salt = U256::from_u32(&self.env, salt);
            let proposal_id = client.compute_proposal_id(content, &salt);
            client.create(
                content,
                &3600,
                &salt,
                &self.params(&client, &proposal_id, blinder),
            )
        }

        fn increment(&self, by: u32) -> ProposalContent {
            let arg: Val = by.into_val(&self.env);
            ProposalContent {
                target: self.counter.clone(),
                value: 0,
                call: Some(ProposalCall {
                    func: Symbol::new(&self.env, "increment"),
                    args: Vec::from_array(&self.env, [arg]),
                }),
            }
        }
    }

    fn ids(env: &Env, from: u32, count: u32) -> Vec<U256> {
        let mut ids = Vec::new(env);
        for i in 0..count {
            ids.push_back(U256::from_u32(env, from + i));
        }
        ids
    }

    fn test_vk(env: &Env) -> VerificationKey {
        let g1 = bn254_g1_generator(env);
        let g2 = bn254_g2_generator(env);
        VerificationKey {
            alpha: g1.clone(),
            beta: g2.clone(),
            gamma: g2.clone(),
            delta: g2,
            // IC[0] plus one point per public input: blinder, challenge, root
            ic: Vec::from_array(env, [g1.clone(), g1.clone(), g1.clone(), g1]),
        }
    }

    fn test_proof(env: &Env) -> Proof {
        let g1 = bn254_g1_generator(env);
        Proof {
            a: g1.clone(),
            b: bn254_g2_generator(env),
            c: g1,
        }
    }

    // BN254 G1 generator: (1, 2)
    fn bn254_g1_generator(env: &Env) -> BytesN<64> {
        let mut bytes = [0u8; 64];
        bytes[31] = 1;
        bytes[63] = 2;
        BytesN::from_array(env, &bytes)
    }

    // BN254 G2 generator
    fn bn254_g2_generator(env: &Env) -> BytesN<128> {
        let bytes: [u8; 128] = [
            0x18, 0x00, 0x50, 0x6a, 0x06, 0x12, 0x86, 0xeb, 0x6a, 0x84, 0xa5, 0x73, 0x0b, 0x8f,
            0x10, 0x29, 0x3e, 0x29, 0x81, 0x6c, 0xd1, 0x91, 0x3d, 0x53, 0x38, 0xf7, 0x15, 0xde,
            0x3e, 0x98, 0xf9, 0xad, 0x19, 0x83, 0x90, 0x42, 0x11, 0xa5, 0x3f, 0x6e, 0x0b, 0x08,
            0x53, 0xa9, 0x0a, 0x00, 0xef, 0xbf, 0xf1, 0x70, 0x0c, 0x7b, 0x1d, 0xc0, 0x06, 0x32,
            0x4d, 0x85, 0x9d, 0x75, 0xe3, 0xca, 0xa5, 0xa2, 0x12, 0xc8, 0x5e, 0xa5, 0xdb, 0x8c,
            0x6d, 0xeb, 0x4a, 0xab, 0x71, 0x8e, 0x80, 0x6a, 0x51, 0xa5, 0x66, 0x08, 0x21, 0x4c,
            0x3f, 0x62, 0x8b, 0x96, 0x2c, 0xf1, 0x91, 0xea, 0xcd, 0xc8, 0x0e, 0x7a, 0x09, 0x0d,
            0x97, 0xc0, 0x9c, 0xe1, 0x48, 0x60, 0x63, 0xb3, 0x59, 0xf3, 0xdd, 0x89, 0xb7, 0xc4,
            0x3c, 0x5f, 0x18, 0x95, 0x8f, 0xb3, 0xe6, 0xb9, 0x6d, 0xb5, 0x5e, 0x19, 0xa3, 0xb7,
            0xc0, 0xfb,
        ];
        BytesN::from_array(env, &bytes)
    }

    fn u256_from_biguint(env: &Env, value: &BigUint) -> U256 {
        let raw = value.to_bytes_be();
        let mut bytes = [0u8; 32];
        bytes[32 - raw.len()..].copy_from_slice(&raw);
        U256::from_be_bytes(env, &Bytes::from_array(env, &bytes))
    }

    #[test]
    fn test_real_verifier_passes_probe() {
        let system = MultisigSystem::new();
        system.init(3, 50, &system.real_verifier);

        assert_eq!(
            system.client().get_participant_verifier(),
            system.real_verifier
        );
        assert_eq!(system.client().get_participants_count(), 3);
    }

    #[test]
    fn test_real_verifier_rejects_forged_proof() {
        let system = MultisigSystem::new();
        system.init(3, 50, &system.real_verifier);
        let client = system.client();

        // Generator points are well formed but do not satisfy the pairing
        let content = system.increment(1);
        let salt = U256::from_u32(&system.env, 1);
        let proposal_id = client.compute_proposal_id(&content, &salt);
        let params = system.params(&client, &proposal_id, 1);

        let result = client.try_create(&content, &3600, &salt, &params);
        assert_eq!(result, Err(Ok(ZkMultisigError::ProofRejected)));
        assert_eq!(client.get_proposals_count(), 0);
    }

    #[test]
    fn test_real_verifier_trap_is_proof_rejection() {
        let system = MultisigSystem::new();
        system.init(3, 50, &system.real_verifier);
        let client = system.client();

        let content = system.increment(1);
        let salt = U256::from_u32(&system.env, 1);
        let proposal_id = client.compute_proposal_id(&content, &salt);
        let mut params = system.params(&client, &proposal_id, 1);

        // (1, 3) is not on the curve; the verifier traps while decoding it
        let mut off_curve = [0u8; 64];
        off_curve[31] = 1;
        off_curve[63] = 3;
        params.proof.a = BytesN::from_array(&system.env, &off_curve);

        let result = client.try_create(&content, &3600, &salt, &params);
        assert_eq!(result, Err(Ok(ZkMultisigError::ProofRejected)));
        assert!(!client.is_blinder_voted(&proposal_id, &U256::from_u32(&system.env, 1)));
    }

    #[test]
    fn test_end_to_end_vote_and_execute() {
        let system = MultisigSystem::new();
        system.init(5, 60, &system.accepting_verifier);
        let client = system.client();

        let proposal_id = system.propose(&system.increment(3), 1, 1);
        assert_eq!(client.get_proposal_info(&proposal_id).required_quorum, 3);

        client.vote(&proposal_id, &system.params(&client, &proposal_id, 2));
        assert_eq!(
            client.get_proposal_status(&proposal_id),
            ProposalStatus::Voting
        );
        client.vote(&proposal_id, &system.params(&client, &proposal_id, 3));
        assert_eq!(
            client.get_proposal_status(&proposal_id),
            ProposalStatus::Accepted
        );

        client.execute(&proposal_id, &0, &None);

        assert_eq!(counter::CounterClient::new(&system.env, &system.counter).count(), 3);
        assert_eq!(
            client.get_proposal_status(&proposal_id),
            ProposalStatus::Executed
        );
    }

    #[test]
    fn test_instances_do_not_share_proofs() {
        let system = MultisigSystem::new();
        system.init(3, 50, &system.accepting_verifier);

        let other_id = system.env.register(ZkMultisig, ());
        let other = ZkMultisigClient::new(&system.env, &other_id);
        other.initialize(
            &ids(&system.env, 1, 3),
            &(PERCENTAGE_100 / 2),
            &system.accepting_verifier,
            &system.asset,
        );

        // Identical participants give identical roots
        let client = system.client();
        assert_eq!(
            client.get_participants_smt_root(),
            other.get_participants_smt_root()
        );

        let content = system.increment(1);
        let salt = U256::from_u32(&system.env, 9);
        let proposal_id = client.compute_proposal_id(&content, &salt);
        assert_eq!(proposal_id, other.compute_proposal_id(&content, &salt));

        // Proof bound to `client` replayed on `other`
        let params = system.params(&client, &proposal_id, 1);
        let result = other.try_create(&content, &3600, &salt, &params);
        assert_eq!(result, Err(Ok(ZkMultisigError::ChallengeMismatch)));

        client.create(&content, &3600, &salt, &params);
        assert!(client.is_blinder_voted(&proposal_id, &U256::from_u32(&system.env, 1)));
        assert_eq!(other.get_proposal_status(&proposal_id), ProposalStatus::None);
    }

    #[test]
    fn test_governance_switches_to_real_verifier() {
        let system = MultisigSystem::new();
        system.init(2, 50, &system.accepting_verifier);
        let client = system.client();

        let arg: Val = system.real_verifier.clone().into_val(&system.env);
        let content = ProposalContent {
            target: system.multisig.clone(),
            value: 0,
            call: Some(ProposalCall {
                func: Symbol::new(&system.env, "update_participant_verifier"),
                args: Vec::from_array(&system.env, [arg]),
            }),
        };
        let proposal_id = system.propose(&content, 1, 1);
        client.execute(&proposal_id, &0, &None);

        assert_eq!(client.get_participant_verifier(), system.real_verifier);

        let content = system.increment(1);
        let salt = U256::from_u32(&system.env, 2);
        let next_id = client.compute_proposal_id(&content, &salt);
        let result = client.try_create(
            &content,
            &3600,
            &salt,
            &system.params(&client, &next_id, 2),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_value_and_call_delivered_together() {
        let system = MultisigSystem::new();
        system.init(3, 1, &system.accepting_verifier);
        let client = system.client();

        let payer = Address::generate(&system.env);
        StellarAssetClient::new(&system.env, &system.asset).mint(&payer, &500);

        let mut content = system.increment(4);
        content.value = 40;
        let proposal_id = system.propose(&content, 1, 1);

        let result = client.try_execute(&proposal_id, &40, &None);
        assert_eq!(result, Err(Ok(ZkMultisigError::MissingPayer)));

        client.execute(&proposal_id, &40, &Some(payer.clone()));

        let token = TokenClient::new(&system.env, &system.asset);
        assert_eq!(token.balance(&system.counter), 40);
        assert_eq!(token.balance(&payer), 460);
        assert_eq!(counter::CounterClient::new(&system.env, &system.counter).count(), 4);
    }

    #[test]
    fn test_participant_field_boundary() {
        let system = MultisigSystem::new();
        let r = BigUint::parse_bytes(
            b"21888242871839275222246405745257275088548364400416034343698204186575808495617",
            10,
        )
        .unwrap();
        let largest = u256_from_biguint(&system.env, &(&r - 1u32));
        let modulus = u256_from_biguint(&system.env, &r);
        assert_eq!(modulus, zk_multisig_groth16::field_modulus(&system.env));

        let client = system.client();
        let too_big = Vec::from_array(&system.env, [U256::from_u32(&system.env, 1), modulus]);
        let result = client.try_initialize(
            &too_big,
            &PERCENTAGE_100,
            &system.accepting_verifier,
            &system.asset,
        );
        assert_eq!(result, Err(Ok(ZkMultisigError::SignalNotInField)));

        let ok = Vec::from_array(&system.env, [U256::from_u32(&system.env, 1), largest.clone()]);
        client.initialize(&ok, &PERCENTAGE_100, &system.accepting_verifier, &system.asset);
        assert!(client.is_participant(&largest));

        let proof = client.get_participants_smt_proof(&largest);
        assert!(proof.existence);
        assert_eq!(proof.root, client.get_participants_smt_root());
    }

    #[test]
    fn test_expired_proposal_stays_closed_after_membership_change() {
        let system = MultisigSystem::new();
        system.init(4, 50, &system.accepting_verifier);
        let client = system.client();

        let stale = system.propose(&system.increment(1), 1, 1);
        system.env.ledger().with_mut(|li| li.timestamp += 3600);
        assert_eq!(client.get_proposal_status(&stale), ProposalStatus::Expired);

        // Growing the set does not revive it
        let arg: Val = ids(&system.env, 50, 2).into_val(&system.env);
        let content = ProposalContent {
            target: system.multisig.clone(),
            value: 0,
            call: Some(ProposalCall {
                func: Symbol::new(&system.env, "add_participants"),
                args: Vec::from_array(&system.env, [arg]),
            }),
        };
        let grow = system.propose(&content, 2, 10);
        client.vote(&grow, &system.params(&client, &grow, 11));
        client.execute(&grow, &0, &None);

        assert_eq!(client.get_participants_count(), 6);
        assert_eq!(client.get_proposal_status(&stale), ProposalStatus::Expired);
        let result = client.try_vote(&stale, &system.params(&client, &stale, 2));
        assert_eq!(result, Err(Ok(ZkMultisigError::NotVoting)));
    }
}
