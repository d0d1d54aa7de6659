//! Error types of the darc crate.

use darc_key::KeyError;
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for darc operations.
pub type DarcResult<T> = Result<T, DarcError>;

/// Defines the types of errors that can occur in darc operations.
#[derive(Debug, Error)]
pub enum DarcError {
    /// A required field is absent, such as the signature on a non-genesis
    /// darc.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The action is already present in the rules.
    #[error("action already exists: {0}")]
    ActionExists(String),

    /// The action is not present in the rules.
    #[error("action does not exist: {0}")]
    MissingAction(String),

    /// The evolution action cannot be updated or deleted through the generic
    /// rules operations.
    #[error("the evolution action cannot be {0} through this operation")]
    EvolveForbidden(&'static str),

    /// User-defined actions must not use the reserved `_` prefix.
    #[error("action name is reserved: {0}")]
    ReservedAction(String),

    /// The evolution chain is structurally broken: base id mismatch, version
    /// not increasing by one, or an empty or malformed path.
    #[error("broken chain: {0}")]
    BrokenChain(String),

    /// Verification of one evolution step in the signature path failed.
    #[error("verification failed at path index {index}: {source}")]
    EvolutionStep {
        /// Index into the signature path of the darc that failed to verify.
        index: usize,
        /// The error raised by that step.
        source: Box<DarcError>,
    },

    /// A raw signature did not verify, or its key material was malformed.
    #[error("invalid signature: {0}")]
    BadSignature(String),

    /// The rule expression evaluated to false for the given identities.
    #[error("unauthorized: expression '{expr}' evaluated to false for identities {ids:?}")]
    Unauthorized {
        /// The expression that rejected the identities.
        expr: String,
        /// The identity strings that were offered.
        ids: Vec<String>,
    },

    /// The request names a different darc than the one checking it.
    #[error("darc id mismatch: request is for {request}, darc is {darc}")]
    IdMismatch {
        /// The darc id carried by the request.
        request: String,
        /// The id of the darc checking the request.
        darc: String,
    },

    /// The requested action is not present in the darc's rules.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// A rule expression could not be parsed or evaluated.
    #[error("expression error: {0}")]
    ExpressionError(String),

    /// A raw signature verification was attempted against a darc-typed
    /// identity. Darc identities are satisfied transitively through chain
    /// verification, never by a bare signature.
    #[error("cannot verify a raw signature against a darc identity")]
    Unverifiable,

    /// The signer kind cannot produce signatures. X509EC signatures are
    /// produced by an external holder of the private key.
    #[error("this signer kind cannot produce signatures")]
    SigningUnsupported,

    /// An identity string could not be parsed.
    #[error("invalid identity string: {0}")]
    InvalidIdentity(String),
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<KeyError> for DarcError {
    fn from(err: KeyError) -> Self {
        DarcError::BadSignature(err.to_string())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `DarcResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> DarcResult<T> {
    Result::Ok(value)
}
