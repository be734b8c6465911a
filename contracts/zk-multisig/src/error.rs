use soroban_sdk::contracterror;

/// Error codes are grouped by class:
/// 1-9 validation, 10-19 state, 20 authorization, 30-39 proof,
/// 40-49 capacity, 50-59 execution.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ZkMultisigError {
    InvalidDuration = 1,
    /// Proposal carries neither value nor a call
    InvalidTarget = 2,
    InvalidValue = 3,
    InvalidQuorumPercentage = 4,
    /// Verifier is unchanged or does not answer the verifier probe
    InvalidVerifier = 5,
    /// Public input vector is not `[blinder, challenge, root]`
    InvalidPublicInputs = 6,
    /// Value >= BN254 scalar field modulus
    SignalNotInField = 7,
    EmptyParticipants = 8,
    /// Self-call names an unknown command or carries malformed arguments
    InvalidSelfCall = 9,

    AlreadyInitialized = 10,
    NotInitialized = 11,
    ProposalExists = 12,
    NotVoting = 13,
    BlinderAlreadyUsed = 14,
    NotAccepted = 15,
    ProposalNotFound = 16,

    /// Privileged entry point invoked outside of `execute`
    NotSelfCall = 20,

    ChallengeMismatch = 30,
    RootMismatch = 31,
    ProofRejected = 32,

    TooManyParticipants = 40,
    LastParticipant = 41,
    /// Two identifiers share every path bit up to the maximum depth
    TreeDepthExceeded = 42,

    ValueMismatch = 50,
    MissingPayer = 51,
    DispatchFailed = 52,
}
