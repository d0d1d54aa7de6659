//! Distributed access right control.
//!
//! A [`Darc`] is a versioned, signable access-control object that binds named
//! actions to boolean expressions over identities. Instead of a fixed list of
//! public keys guarding a resource, a darc carries an evolving description of
//! who may do what: each new version references its predecessor and is signed
//! by an identity the predecessor's evolution rule admits, and rules may
//! delegate to other darcs, which are resolved transitively at verification
//! time.
//!
//! The crate is a pure, synchronous library. Storage is abstracted behind a
//! `get_darc` lookup supplied by the caller; nothing here performs I/O.

#![warn(missing_docs)]
#![allow(clippy::module_inception)]

mod darc;
mod error;
mod expression;
mod id;
mod identity;
mod request;
mod rules;
mod signature;
mod signer;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use darc::*;
pub use error::*;
pub use expression::*;
pub use id::*;
pub use identity::*;
pub use request::*;
pub use rules::*;
pub use signature::*;
pub use signer::*;
