//! Participant set backed by a sparse Merkle tree.
//!
//! The tree follows the iden3 layout so proofs can be checked by the
//! participant circuit:
//! - empty node hashes to 0
//! - `Leaf(key, value)` hashes to `Poseidon(key, value, 1)`
//! - `Middle(left, right)` hashes to `Poseidon(left, right)`
//! - the path bit at depth `d` is bit `d` of the key, least significant first
//!
//! A leaf is stored at the shallowest depth that separates it from every other
//! key, and a middle node never holds a single leaf next to an empty sibling.
//! The tree shape is therefore a function of the key set alone: inserting the
//! same ids in any order, or removing an id, lands on the same root as building
//! the resulting set from scratch.
//!
//! Nodes are content addressed (`SmtNode(hash)`), so unchanged subtrees are
//! shared between successive roots. An enumerable index of the current ids is
//! kept next to the tree so membership checks do not walk it.

use soroban_sdk::{contracttype, Bytes, Env, Vec, U256};

use crate::error::ZkMultisigError;
use crate::hash::poseidon;
use crate::storage::{DataKey, PARTICIPANT_COUNT, SMT_DEPTH, SMT_ROOT};

pub const SMT_MAX_DEPTH: u32 = 20; // 2^20 = 1,048,576 participants
pub const MAX_PARTICIPANTS: u32 = 1 << SMT_MAX_DEPTH;

#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub enum SmtNode {
    Middle(U256, U256), // (left, right)
    Leaf(U256, U256),   // (key, value)
}

/// Inclusion or exclusion proof for one key.
///
/// For an exclusion proof that ends on another leaf, `aux_*` carries that
/// leaf so the verifier can rebuild the path.
#[contracttype]
#[derive(Clone, Debug, PartialEq)]
pub struct SmtProof {
    pub root: U256,
    pub siblings: Vec<U256>,
    pub existence: bool,
    pub key: U256,
    pub value: U256,
    pub aux_existence: bool,
    pub aux_key: U256,
    pub aux_value: U256,
}

pub struct MembershipSet {
    env: Env,
    depth: u32,
    root: U256,
    size: u32,
}

impl MembershipSet {
    /// Start an empty set with the given maximum depth.
    pub fn initialize(env: &Env, depth: u32) -> Self {
        let set = Self {
            env: env.clone(),
            depth,
            root: zero(env),
            size: 0,
        };
        set.save();
        set
    }

    pub fn load(env: &Env) -> Self {
        let storage = env.storage().instance();
        Self {
            env: env.clone(),
            depth: storage.get(&SMT_DEPTH).unwrap_or(SMT_MAX_DEPTH),
            root: storage.get(&SMT_ROOT).unwrap_or_else(|| zero(env)),
            size: storage.get(&PARTICIPANT_COUNT).unwrap_or(0),
        }
    }

    fn save(&self) {
        let storage = self.env.storage().instance();
        storage.set(&SMT_DEPTH, &self.depth);
        storage.set(&SMT_ROOT, &self.root);
        storage.set(&PARTICIPANT_COUNT, &self.size);
    }

    pub fn root(&self) -> U256 {
        self.root.clone()
    }

    pub fn len(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn contains(&self, id: &U256) -> bool {
        self.env
            .storage()
            .persistent()
            .has(&DataKey::ParticipantIndex(id.clone()))
    }

    /// Insert `id` as both key and value. Returns false if already present.
    pub fn add(&mut self, id: &U256) -> Result<bool, ZkMultisigError> {
        if self.contains(id) {
            return Ok(false);
        }

        let bits = id.to_be_bytes();
        let leaf = self.put(SmtNode::Leaf(id.clone(), id.clone()));
        self.root = self.insert_at(self.root.clone(), leaf, &bits, 0)?;

        self.index_push(id);
        self.size += 1;
        self.save();
        Ok(true)
    }

    /// Delete `id`. Returns false if it was not present.
    pub fn remove(&mut self, id: &U256) -> Result<bool, ZkMultisigError> {
        if !self.contains(id) {
            return Ok(false);
        }

        let bits = id.to_be_bytes();
        self.root = self.remove_at(self.root.clone(), id, &bits, 0);

        self.index_remove(id);
        self.size -= 1;
        self.save();
        Ok(true)
    }

    /// Walk the path of `key` and collect the siblings, padded with zeros to
    /// the maximum depth.
    pub fn proof(&self, key: &U256) -> SmtProof {
        let env = &self.env;
        let bits = key.to_be_bytes();
        let mut proof = SmtProof {
            root: self.root.clone(),
            siblings: Vec::new(env),
            existence: false,
            key: key.clone(),
            value: zero(env),
            aux_existence: false,
            aux_key: zero(env),
            aux_value: zero(env),
        };

        let mut node = self.root.clone();
        let mut depth = 0;
        while !is_zero(env, &node) {
            match self.node(&node) {
                SmtNode::Leaf(leaf_key, leaf_value) => {
                    if leaf_key == *key {
                        proof.existence = true;
                        proof.value = leaf_value;
                    } else {
                        proof.aux_existence = true;
                        proof.aux_key = leaf_key;
                        proof.aux_value = leaf_value;
                    }
                    break;
                }
                SmtNode::Middle(left, right) => {
                    if path_bit(&bits, depth) == 0 {
                        proof.siblings.push_back(right);
                        node = left;
                    } else {
                        proof.siblings.push_back(left);
                        node = right;
                    }
                    depth += 1;
                }
            }
        }

        while proof.siblings.len() < self.depth {
            proof.siblings.push_back(zero(env));
        }
        proof
    }

    /// Current participant ids in index order.
    pub fn participants(&self) -> Vec<U256> {
        let storage = self.env.storage().persistent();
        let mut ids = Vec::new(&self.env);
        for i in 0..self.size {
            if let Some(id) = storage.get(&DataKey::ParticipantAt(i)) {
                ids.push_back(id);
            }
        }
        ids
    }

    fn insert_at(
        &self,
        node: U256,
        leaf: U256,
        bits: &Bytes,
        depth: u32,
    ) -> Result<U256, ZkMultisigError> {
        if is_zero(&self.env, &node) {
            return Ok(leaf);
        }

        match self.node(&node) {
            SmtNode::Leaf(old_key, _) => {
                self.push_leaf(leaf, bits, node, &old_key.to_be_bytes(), depth)
            }
            SmtNode::Middle(left, right) => {
                let (left, right) = if path_bit(bits, depth) == 0 {
                    (self.insert_at(left, leaf, bits, depth + 1)?, right)
                } else {
                    (left, self.insert_at(right, leaf, bits, depth + 1)?)
                };
                Ok(self.put(SmtNode::Middle(left, right)))
            }
        }
    }

    // Split two leaves that collide at `depth` into a chain of middle nodes
    // ending where their path bits first differ.
    fn push_leaf(
        &self,
        new_leaf: U256,
        new_bits: &Bytes,
        old_leaf: U256,
        old_bits: &Bytes,
        depth: u32,
    ) -> Result<U256, ZkMultisigError> {
        if depth >= self.depth {
            return Err(ZkMultisigError::TreeDepthExceeded);
        }

        let new_bit = path_bit(new_bits, depth);
        let old_bit = path_bit(old_bits, depth);

        let middle = if new_bit == old_bit {
            let child = self.push_leaf(new_leaf, new_bits, old_leaf, old_bits, depth + 1)?;
            if new_bit == 0 {
                SmtNode::Middle(child, zero(&self.env))
            } else {
                SmtNode::Middle(zero(&self.env), child)
            }
        } else if new_bit == 0 {
            SmtNode::Middle(new_leaf, old_leaf)
        } else {
            SmtNode::Middle(old_leaf, new_leaf)
        };

        Ok(self.put(middle))
    }

    fn remove_at(&self, node: U256, key: &U256, bits: &Bytes, depth: u32) -> U256 {
        let env = &self.env;
        match self.node(&node) {
            SmtNode::Leaf(leaf_key, _) if leaf_key == *key => zero(env),
            SmtNode::Leaf(..) => node,
            SmtNode::Middle(left, right) => {
                let (left, right) = if path_bit(bits, depth) == 0 {
                    (self.remove_at(left, key, bits, depth + 1), right)
                } else {
                    (left, self.remove_at(right, key, bits, depth + 1))
                };

                // A lone leaf moves up to take the place of its parent
                if is_zero(env, &left) && self.is_leaf(&right) {
                    return right;
                }
                if is_zero(env, &right) && self.is_leaf(&left) {
                    return left;
                }
                if is_zero(env, &left) && is_zero(env, &right) {
                    return zero(env);
                }
                self.put(SmtNode::Middle(left, right))
            }
        }
    }

    fn node(&self, hash: &U256) -> SmtNode {
        self.env
            .storage()
            .persistent()
            .get(&DataKey::SmtNode(hash.clone()))
            .expect("smt node missing")
    }

    fn is_leaf(&self, hash: &U256) -> bool {
        !is_zero(&self.env, hash) && matches!(self.node(hash), SmtNode::Leaf(..))
    }

    // Store a node under its hash and return the hash
    fn put(&self, node: SmtNode) -> U256 {
        let hash = node_hash(&self.env, &node);
        let key = DataKey::SmtNode(hash.clone());
        let storage = self.env.storage().persistent();
        if !storage.has(&key) {
            storage.set(&key, &node);
        }
        hash
    }

    fn index_push(&self, id: &U256) {
        let storage = self.env.storage().persistent();
        storage.set(&DataKey::ParticipantAt(self.size), id);
        storage.set(&DataKey::ParticipantIndex(id.clone()), &self.size);
    }

    // Swap-remove: the last id takes the freed slot
    fn index_remove(&self, id: &U256) {
        let storage = self.env.storage().persistent();
        let index_key = DataKey::ParticipantIndex(id.clone());
        let index: u32 = storage.get(&index_key).unwrap_or(0);
        let last = self.size - 1;

        if index != last {
            let last_id: U256 = storage
                .get(&DataKey::ParticipantAt(last))
                .expect("participant index out of sync");
            storage.set(&DataKey::ParticipantAt(index), &last_id);
            storage.set(&DataKey::ParticipantIndex(last_id), &index);
        }

        storage.remove(&DataKey::ParticipantAt(last));
        storage.remove(&index_key);
    }
}

pub fn node_hash(env: &Env, node: &SmtNode) -> U256 {
    match node {
        SmtNode::Leaf(key, value) => {
            let inputs = soroban_sdk::vec![env, key.clone(), value.clone(), U256::from_u32(env, 1)];
            poseidon(env, &inputs)
        }
        SmtNode::Middle(left, right) => {
            let inputs = soroban_sdk::vec![env, left.clone(), right.clone()];
            poseidon(env, &inputs)
        }
    }
}

/// Bit `depth` of a big-endian 32-byte key, counting from the least
/// significant bit.
pub fn path_bit(bits: &Bytes, depth: u32) -> u8 {
    let byte = bits.get(31 - depth / 8).unwrap_or(0);
    (byte >> (depth % 8)) & 1
}

fn zero(env: &Env) -> U256 {
    U256::from_u32(env, 0)
}

fn is_zero(env: &Env, value: &U256) -> bool {
    *value == zero(env)
}
