use p384::{
    ecdsa::{
        signature::{Signer, Verifier},
        Signature, SigningKey, VerifyingKey,
    },
    pkcs8::{DecodePublicKey, EncodePublicKey},
};
use rand_core::CryptoRngCore;

use crate::{AsymmetricKey, KeyPairGenerate, KeyResult, PubKey, PublicKeyGenerate, Sign, Verify};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A [`NIST P-384`][ref] public key.
///
/// The key is exchanged in PKIX/X.509 `SubjectPublicKeyInfo` DER form, the
/// encoding that X.509 certificate holders present.
///
/// [ref]: https://en.wikipedia.org/wiki/Elliptic_Curve_Digital_Signature_Algorithm
pub type P384PubKey = PubKey<VerifyingKey>;

/// A [`NIST P-384`][ref] key pair with a signing key.
///
/// [ref]: https://en.wikipedia.org/wiki/Elliptic_Curve_Digital_Signature_Algorithm
pub type P384KeyPair = P384Key<SigningKey>;

pub(crate) type P384Key<S> = AsymmetricKey<VerifyingKey, S>;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<S> P384Key<S> {
    /// Encodes the public key as PKIX/X.509 `SubjectPublicKeyInfo` DER.
    pub fn to_pkix_der(&self) -> KeyResult<Vec<u8>> {
        Ok(self.public.to_public_key_der()?.as_bytes().to_vec())
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<S> Verify for P384Key<S> {
    /// Verifies an ASN.1 DER encoded `{R, S}` signature over the SHA-384
    /// digest of `data`.
    fn verify(&self, data: &[u8], signature: &[u8]) -> KeyResult<()> {
        let signature = Signature::from_der(signature)?;
        self.public.verify(data, &signature).map_err(Into::into)
    }
}

impl Sign for P384KeyPair {
    /// Signs the SHA-384 digest of `data`, returning the signature in ASN.1
    /// DER form.
    fn sign(&self, data: &[u8]) -> KeyResult<Vec<u8>> {
        let signature: Signature = self.private.try_sign(data)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

impl PublicKeyGenerate for P384PubKey {
    /// Parses a public key from PKIX/X.509 `SubjectPublicKeyInfo` DER bytes.
    fn from_public_key(bytes: &[u8]) -> KeyResult<Self> {
        Ok(Self {
            public: VerifyingKey::from_public_key_der(bytes)?,
            private: (),
        })
    }
}

impl KeyPairGenerate for P384KeyPair {
    fn generate(rng: &mut impl CryptoRngCore) -> KeyResult<Self> {
        let signing_key = SigningKey::random(rng);
        Ok(Self {
            public: *signing_key.verifying_key(),
            private: signing_key,
        })
    }

    fn from_private_key(bytes: &[u8]) -> KeyResult<Self> {
        let signing_key = SigningKey::try_from(bytes)?;
        Ok(Self {
            public: *signing_key.verifying_key(),
            private: signing_key,
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
