//! Key pairs, digests and raw signature primitives used by the darc access
//! control core.
//!
//! Two key kinds are supported:
//! - `ed25519` keys producing EdDSA signatures, and
//! - `NIST P-384` keys carried as PKIX/X.509 DER producing ASN.1 DER ECDSA
//!   signatures over a SHA-384 digest.

#![warn(missing_docs)]

mod digest;
mod ed25519;
mod error;
mod key;
mod p384;
mod traits;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use digest::*;
pub use ed25519::*;
pub use error::*;
pub use key::*;
pub use p384::*;
pub use traits::*;
