use darc_key::sha256_concat;
use serde::{Deserialize, Serialize};

use crate::{Darc, DarcError, DarcId, DarcResult, Identity, Signer};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The signature binding a darc to its predecessors.
///
/// Every non-genesis darc embeds one. The `path` is the full history of the
/// series, ordered from the genesis darc to the immediate predecessor, and is
/// part of the signed message: the raw signature covers
/// `sha256(id || path_msg)` where `path_msg` concatenates the ids of the path
/// darcs. A verifier can therefore replay the whole chain of custody from the
/// signature alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DarcSignature {
    pub(crate) signature: Vec<u8>,
    pub(crate) signer: Identity,
    pub(crate) path: Vec<Darc>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl DarcSignature {
    /// Signs the digest of `id` and the path message with the given signer,
    /// producing the signature to embed in the darc with that id.
    pub fn new(signer: &Signer, id: DarcId, path: &[Darc]) -> DarcResult<Self> {
        if path.is_empty() {
            return Err(DarcError::BrokenChain(
                "the signature path cannot be empty".to_string(),
            ));
        }

        let digest = sha256_concat([id.as_bytes(), &path_msg(path)]);
        let signature = signer.sign(&digest)?;

        Ok(Self {
            signature,
            signer: signer.identity(),
            path: path.to_vec(),
        })
    }

    /// Returns the raw signature bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.signature
    }

    /// Returns the identity that produced the signature.
    pub fn signer(&self) -> &Identity {
        &self.signer
    }

    /// Returns the embedded path, ordered from the genesis darc to the
    /// immediate predecessor.
    pub fn path(&self) -> &[Darc] {
        &self.path
    }

    /// Returns the concatenated ids of the path darcs, the part of the signed
    /// message that pins the history.
    pub fn path_msg(&self) -> Vec<u8> {
        path_msg(&self.path)
    }

    /// Whether any darc in the path satisfies the predicate.
    pub fn path_contains(&self, pred: impl Fn(&Darc) -> bool) -> bool {
        self.path.iter().any(pred)
    }

    /// Verifies that this signature covers `msg` and the embedded path, that
    /// the path is rooted at `base`, and that the raw signature verifies
    /// against the signer identity.
    pub(crate) fn verify(&self, msg: &[u8], base: DarcId) -> DarcResult<()> {
        if self.path.is_empty() {
            return Err(DarcError::BrokenChain(
                "the signature path cannot be empty".to_string(),
            ));
        }
        if self.path[0].id() != base {
            return Err(DarcError::BrokenChain(
                "the base darc is not at the root of the path".to_string(),
            ));
        }

        let digest = sha256_concat([msg, &self.path_msg()]);
        self.signer.verify(&digest, &self.signature)
    }
}

fn path_msg(path: &[Darc]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(path.len() * 32);
    for darc in path {
        msg.extend_from_slice(darc.id().as_bytes());
    }
    msg
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::Rules;

    use super::*;

    #[test]
    fn test_signature_requires_a_path() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let signer = Signer::generate_ed25519(&mut rng)?;

        let result = DarcSignature::new(&signer, DarcId::new([1; 32]), &[]);
        assert!(matches!(result, Err(DarcError::BrokenChain(_))));

        Ok(())
    }

    #[test]
    fn test_signature_round_trip() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let signer = Signer::generate_ed25519(&mut rng)?;

        let genesis = Darc::new(Rules::with_owners([&signer.identity()]), "root");
        let id = DarcId::new([7; 32]);

        let signature = DarcSignature::new(&signer, id, &[genesis.clone()])?;
        signature.verify(id.as_bytes(), genesis.id())?;

        assert_eq!(signature.signer(), &signer.identity());
        assert_eq!(signature.path_msg(), genesis.id().to_vec());

        Ok(())
    }

    #[test]
    fn test_signature_rejects_wrong_base() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let signer = Signer::generate_ed25519(&mut rng)?;

        let genesis = Darc::new(Rules::with_owners([&signer.identity()]), "root");
        let id = DarcId::new([7; 32]);

        let signature = DarcSignature::new(&signer, id, &[genesis])?;
        let result = signature.verify(id.as_bytes(), DarcId::new([8; 32]));
        assert!(matches!(result, Err(DarcError::BrokenChain(_))));

        Ok(())
    }
}
