use std::{fmt::Display, str::FromStr};

use darc_key::{Ed25519PubKey, P384PubKey, PublicKeyBytes, PublicKeyGenerate, Verify};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{DarcError, DarcId, DarcResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The string tag of darc-typed identities.
pub const DARC_IDENTITY_KIND: &str = "darc";

/// The string tag of ed25519 public key identities.
pub const ED25519_IDENTITY_KIND: &str = "ed25519";

/// The string tag of X.509 elliptic curve public key identities.
pub const X509EC_IDENTITY_KIND: &str = "x509ec";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A verifiable principal: a public key, or a reference to another darc.
///
/// The string form `"<kind>:<payload>"` is the canonical fact fed to the
/// expression engine, and the form rules name identities in. Payloads are
/// lowercase hex: the referenced darc id, the 32-byte compressed Edwards
/// point, or the PKIX/X.509 DER of the public key.
///
/// A darc-typed identity cannot verify a raw signature. It is satisfied
/// transitively, by resolving the referenced darc and checking its evolution
/// chain during [`Darc::verify_with`][verify].
///
/// [verify]: crate::Darc::verify_with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// A reference to another darc series by id.
    Darc(DarcId),

    /// An `ed25519` public key.
    Ed25519(Ed25519PubKey),

    /// An elliptic curve public key carried as PKIX/X.509 DER, verified with
    /// ECDSA over P-384.
    X509Ec(Vec<u8>),
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Identity {
    /// Creates an identity from PKIX/X.509 DER public key bytes.
    ///
    /// The DER is not parsed here; a malformed key surfaces as an invalid
    /// signature when the identity is asked to verify.
    pub fn x509_ec(der: impl Into<Vec<u8>>) -> Self {
        Self::X509Ec(der.into())
    }

    /// Returns the numeric tag of the identity kind: 0 for darc, 1 for
    /// ed25519, 2 for x509ec.
    pub fn tag(&self) -> u8 {
        match self {
            Identity::Darc(_) => 0,
            Identity::Ed25519(_) => 1,
            Identity::X509Ec(_) => 2,
        }
    }

    /// Returns the string tag of the identity kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Identity::Darc(_) => DARC_IDENTITY_KIND,
            Identity::Ed25519(_) => ED25519_IDENTITY_KIND,
            Identity::X509Ec(_) => X509EC_IDENTITY_KIND,
        }
    }

    /// Verifies a raw signature over `msg` against this identity.
    ///
    /// Dispatches on the identity kind: EdDSA for ed25519 keys, ECDSA-P384
    /// over a SHA-384 digest for x509ec keys. Darc identities fail with
    /// [`DarcError::Unverifiable`].
    pub fn verify(&self, msg: &[u8], signature: &[u8]) -> DarcResult<()> {
        match self {
            Identity::Darc(_) => Err(DarcError::Unverifiable),
            Identity::Ed25519(public) => Ok(public.verify(msg, signature)?),
            Identity::X509Ec(der) => {
                let public = P384PubKey::from_public_key(der)?;
                Ok(public.verify(msg, signature)?)
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Darc(id) => write!(f, "{}:{}", self.kind(), id),
            Identity::Ed25519(public) => {
                write!(f, "{}:{}", self.kind(), hex::encode(public.public_key_bytes()))
            }
            Identity::X509Ec(der) => write!(f, "{}:{}", self.kind(), hex::encode(der)),
        }
    }
}

impl FromStr for Identity {
    type Err = DarcError;

    fn from_str(s: &str) -> DarcResult<Self> {
        let (kind, payload) = s
            .split_once(':')
            .ok_or_else(|| DarcError::InvalidIdentity(s.to_string()))?;

        match kind {
            DARC_IDENTITY_KIND => Ok(Identity::Darc(DarcId::from_str(payload)?)),
            ED25519_IDENTITY_KIND => {
                let bytes = hex::decode(payload)
                    .map_err(|_| DarcError::InvalidIdentity(s.to_string()))?;
                let public = Ed25519PubKey::from_public_key(&bytes)
                    .map_err(|_| DarcError::InvalidIdentity(s.to_string()))?;
                Ok(Identity::Ed25519(public))
            }
            X509EC_IDENTITY_KIND => {
                let der = hex::decode(payload)
                    .map_err(|_| DarcError::InvalidIdentity(s.to_string()))?;
                Ok(Identity::X509Ec(der))
            }
            _ => Err(DarcError::InvalidIdentity(s.to_string())),
        }
    }
}

impl From<DarcId> for Identity {
    fn from(id: DarcId) -> Self {
        Identity::Darc(id)
    }
}

impl From<Ed25519PubKey> for Identity {
    fn from(public: Ed25519PubKey) -> Self {
        Identity::Ed25519(public)
    }
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D>(deserializer: D) -> Result<Identity, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identity::from_str(&s).map_err(serde::de::Error::custom)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
