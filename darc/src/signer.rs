use darc_key::{Ed25519KeyPair, KeyPairBytes, KeyPairGenerate, Sign};
use rand_core::CryptoRngCore;

use crate::{DarcError, DarcResult, Identity};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The private side of an identity: a key holder that can produce signatures.
///
/// Darc identities are deliberately absent. A darc cannot sign anything; it
/// authorizes transitively, through the evolution chain of the darc it
/// references.
#[derive(Debug, Clone)]
pub enum Signer {
    /// An `ed25519` key pair producing EdDSA signatures.
    Ed25519(Ed25519KeyPair),

    /// The holder of an X.509 elliptic curve credential. The public key is
    /// PKIX/X.509 DER; the private key is opaque and never used here, since
    /// signing with it is the business of whatever external system issued
    /// the credential.
    X509Ec(X509EcSigner),
}

/// An X.509 elliptic curve credential: public key DER plus an opaque private
/// part.
#[derive(Debug, Clone)]
pub struct X509EcSigner {
    public: Vec<u8>,
    #[allow(dead_code)]
    secret: Vec<u8>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Signer {
    /// Generates a fresh ed25519 signer.
    pub fn generate_ed25519(rng: &mut impl CryptoRngCore) -> DarcResult<Self> {
        Ok(Signer::Ed25519(Ed25519KeyPair::generate(rng)?))
    }

    /// Returns the numeric tag of the signer kind, compatible with
    /// [`Identity::tag`]: 1 for ed25519, 2 for x509ec.
    pub fn tag(&self) -> u8 {
        match self {
            Signer::Ed25519(_) => 1,
            Signer::X509Ec(_) => 2,
        }
    }

    /// Returns the identity of the matching kind for this signer.
    pub fn identity(&self) -> Identity {
        match self {
            Signer::Ed25519(key_pair) => Identity::Ed25519(key_pair.public_key()),
            Signer::X509Ec(signer) => Identity::x509_ec(signer.public.clone()),
        }
    }

    /// Signs a message, returning the raw signature bytes.
    ///
    /// X509EC signers fail with [`DarcError::SigningUnsupported`]; their
    /// signatures are produced externally and verified through
    /// [`Identity::verify`].
    pub fn sign(&self, msg: &[u8]) -> DarcResult<Vec<u8>> {
        match self {
            Signer::Ed25519(key_pair) => Ok(key_pair.sign(msg)?),
            Signer::X509Ec(_) => Err(DarcError::SigningUnsupported),
        }
    }

    /// Returns the private key bytes, if this signer kind exposes them.
    pub fn private_key_bytes(&self) -> DarcResult<Vec<u8>> {
        match self {
            Signer::Ed25519(key_pair) => Ok(key_pair.private_key_bytes()),
            Signer::X509Ec(_) => Err(DarcError::SigningUnsupported),
        }
    }
}

impl X509EcSigner {
    /// Creates a signer from a PKIX/X.509 DER public key and an opaque
    /// private part.
    pub fn new(public: impl Into<Vec<u8>>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            public: public.into(),
            secret: secret.into(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl From<Ed25519KeyPair> for Signer {
    fn from(key_pair: Ed25519KeyPair) -> Self {
        Signer::Ed25519(key_pair)
    }
}

impl From<X509EcSigner> for Signer {
    fn from(signer: X509EcSigner) -> Self {
        Signer::X509Ec(signer)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signer_identity_matches_kind() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();

        let signer = Signer::generate_ed25519(&mut rng)?;
        assert_eq!(signer.tag(), 1);
        assert_eq!(signer.identity().tag(), 1);

        let signer = Signer::from(X509EcSigner::new(vec![1, 2, 3], vec![]));
        assert_eq!(signer.tag(), 2);
        assert_eq!(signer.identity().tag(), 2);

        Ok(())
    }

    #[test]
    fn test_ed25519_signer_signs_for_its_identity() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let signer = Signer::generate_ed25519(&mut rng)?;

        let msg = b"attack at dawn";
        let signature = signer.sign(msg)?;

        signer.identity().verify(msg, &signature)?;

        Ok(())
    }

    #[test]
    fn test_x509ec_signer_cannot_sign() {
        let signer = Signer::from(X509EcSigner::new(vec![1, 2, 3], vec![4, 5, 6]));

        assert!(matches!(
            signer.sign(b"msg"),
            Err(DarcError::SigningUnsupported)
        ));
        assert!(signer.private_key_bytes().is_err());
    }
}
