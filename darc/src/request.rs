use darc_key::sha256_concat;
use serde::{Deserialize, Serialize};

use crate::{Action, DarcId, DarcResult, Identity, Signer};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A client's claim to execute an action guarded by a darc.
///
/// The request names the darc, the action and an application-defined message,
/// and carries one signature per presented identity. Each signature covers
/// the request hash, which excludes the identities and signatures themselves,
/// so every identity signs the same digest independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub(crate) darc_id: DarcId,
    pub(crate) action: Action,
    pub(crate) msg: Vec<u8>,
    pub(crate) identities: Vec<Identity>,
    pub(crate) signatures: Vec<Vec<u8>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Request {
    /// Builds a request and signs its hash with every given signer, attaching
    /// identities and signatures in matching index order.
    pub fn new(
        darc_id: DarcId,
        action: Action,
        msg: impl Into<Vec<u8>>,
        signers: &[&Signer],
    ) -> DarcResult<Self> {
        let mut request = Self {
            darc_id,
            action,
            msg: msg.into(),
            identities: Vec::with_capacity(signers.len()),
            signatures: Vec::with_capacity(signers.len()),
        };

        let digest = request.hash();
        for signer in signers {
            request.identities.push(signer.identity());
            request.signatures.push(signer.sign(&digest)?);
        }

        Ok(request)
    }

    /// Computes the digest of the request: `sha256(darc_id || action || msg)`.
    ///
    /// Identities and signatures are not covered; this digest is what each
    /// identity signs.
    pub fn hash(&self) -> [u8; 32] {
        sha256_concat([
            self.darc_id.as_bytes(),
            self.action.as_str().as_bytes(),
            self.msg.as_slice(),
        ])
    }

    /// Returns the id of the darc this request is addressed to.
    pub fn darc_id(&self) -> DarcId {
        self.darc_id
    }

    /// Returns the requested action.
    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Returns the application payload.
    pub fn msg(&self) -> &[u8] {
        &self.msg
    }

    /// Returns the presented identities.
    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Returns the signatures, index-aligned with the identities.
    pub fn signatures(&self) -> &[Vec<u8>] {
        &self.signatures
    }

    /// Returns the string forms of the presented identities, the facts the
    /// rule expression is evaluated over.
    pub fn identity_strings(&self) -> Vec<String> {
        self.identities.iter().map(|id| id.to_string()).collect()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_hash_excludes_signatures() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let signer = Signer::generate_ed25519(&mut rng)?;

        let unsigned = Request::new(DarcId::new([1; 32]), Action::from("read"), "hello", &[])?;
        let signed = Request::new(
            DarcId::new([1; 32]),
            Action::from("read"),
            "hello",
            &[&signer],
        )?;
        assert_eq!(unsigned.hash(), signed.hash());

        let other_msg = Request::new(DarcId::new([1; 32]), Action::from("read"), "hellp", &[])?;
        assert_ne!(unsigned.hash(), other_msg.hash());

        let other_action = Request::new(DarcId::new([1; 32]), Action::from("write"), "hello", &[])?;
        assert_ne!(unsigned.hash(), other_action.hash());

        let other_darc = Request::new(DarcId::new([2; 32]), Action::from("read"), "hello", &[])?;
        assert_ne!(unsigned.hash(), other_darc.hash());

        Ok(())
    }

    #[test]
    fn test_request_signatures_align_with_identities() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let alice = Signer::generate_ed25519(&mut rng)?;
        let bob = Signer::generate_ed25519(&mut rng)?;

        let request = Request::new(
            DarcId::new([1; 32]),
            Action::from("read"),
            "hello",
            &[&alice, &bob],
        )?;

        assert_eq!(request.identities().len(), 2);
        assert_eq!(request.signatures().len(), 2);

        let digest = request.hash();
        for (identity, signature) in request.identities().iter().zip(request.signatures()) {
            identity.verify(&digest, signature)?;
        }

        assert_eq!(
            request.identity_strings(),
            [alice.identity().to_string(), bob.identity().to_string()]
        );

        Ok(())
    }
}
