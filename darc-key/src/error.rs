//! Error types of the darc-key crate.

use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// The main error type of the darc-key crate.
#[derive(Debug, Error)]
pub enum KeyError {
    /// A signature could not be created or did not verify, or key/signature
    /// bytes were malformed.
    #[error("signature error: {0}")]
    SignatureError(#[from] signature::Error),

    /// Public key material in PKIX/X.509 DER form could not be parsed.
    #[error("malformed key material: {0}")]
    MalformedKey(#[from] p384::pkcs8::spki::Error),
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Creates an `Ok` `KeyResult`.
#[allow(non_snake_case)]
pub fn Ok<T>(value: T) -> KeyResult<T> {
    Result::Ok(value)
}
