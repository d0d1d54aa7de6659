use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use rand_core::CryptoRngCore;

use crate::{
    AsymmetricKey, KeyPairBytes, KeyPairGenerate, KeyResult, PubKey, PublicKeyBytes,
    PublicKeyGenerate, Sign, Verify,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An [`ed25519`][ref] verifying key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
pub type Ed25519PubKey = PubKey<VerifyingKey>;

/// An [`ed25519`][ref] key pair with a signing key.
///
/// [ref]: https://en.wikipedia.org/wiki/EdDSA
pub type Ed25519KeyPair = Ed25519Key<SigningKey>;

pub(crate) type Ed25519Key<S> = AsymmetricKey<VerifyingKey, S>;

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> Verify for Ed25519Key<S> {
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        self.public
            .verify_strict(data, &Signature::try_from(signature)?)
            .map_err(Into::into)
    }
}

impl Sign for Ed25519KeyPair {
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature = self.private.try_sign(data)?;
        Ok(signature.to_vec())
    }
}

impl PublicKeyGenerate for Ed25519PubKey {
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        Ok(Self {
            public: VerifyingKey::try_from(bytes)?,
            private: (),
        })
    }
}

impl KeyPairGenerate for Ed25519KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        let signing_key = SigningKey::generate(rng);
        Ok(Self {
            public: signing_key.verifying_key(),
            private: signing_key,
        })
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let signing_key = SigningKey::try_from(bytes)?;
        Ok(Self {
            public: signing_key.verifying_key(),
            private: signing_key,
        })
    }
}

impl<S> PublicKeyBytes for Ed25519Key<S> {
    /// Returns the 32-byte compressed Edwards point.
    fn public_key_bytes(&self) -> Vec<u8> {
        self.public.to_bytes().to_vec()
    }
}

impl KeyPairBytes for Ed25519KeyPair {
    fn private_key_bytes(&self) -> Vec<u8> {
        self.private.to_bytes().to_vec()
    }
}

impl From<Ed25519KeyPair> for Ed25519PubKey {
    fn from(key_pair: Ed25519KeyPair) -> Self {
        Self {
            public: key_pair.public,
            private: (),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ed25519_generate() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;

        let public_key_bytes = key_pair.public_key_bytes();
        let public_key = Ed25519PubKey::from_public_key(&public_key_bytes)?;

        assert_eq!(key_pair.public_key(), public_key);

        let private_key_bytes = key_pair.private_key_bytes();
        let restored = Ed25519KeyPair::from_private_key(&private_key_bytes)?;

        assert_eq!(restored.public_key_bytes(), public_key_bytes);
        assert_eq!(restored.private_key_bytes(), private_key_bytes);

        Ok(())
    }

    #[test]
    fn test_ed25519_sign_and_verify() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;

        let data = b"attack at dawn";
        let signature = key_pair.sign(data)?;

        key_pair.verify(data, &signature)?;
        key_pair.public_key().verify(data, &signature)?;

        Ok(())
    }

    #[test]
    fn test_ed25519_verify_rejects_tampering() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;

        let data = b"attack at dawn";
        let mut signature = key_pair.sign(data)?;

        assert!(key_pair.verify(b"attack at dusk", &signature).is_err());

        signature[0] ^= 1;
        assert!(key_pair.verify(data, &signature).is_err());

        Ok(())
    }

    #[test]
    fn test_ed25519_verify_rejects_other_key() -> anyhow::Result<()> {
        let mut rng = rand::thread_rng();
        let key_pair = Ed25519KeyPair::generate(&mut rng)?;
        let other = Ed25519KeyPair::generate(&mut rng)?;

        let data = b"attack at dawn";
        let signature = key_pair.sign(data)?;

        assert!(other.verify(data, &signature).is_err());

        Ok(())
    }
}
