//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A key with a public component and an optional private component.
///
/// Keys are held owned. Access control objects embed their key material and
/// outlive whatever produced it, so there is nothing to borrow from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricKey<P, S> {
    pub(crate) public: P,
    pub(crate) private: S,
}

/// A public key without a private component.
pub type PubKey<P> = AsymmetricKey<P, ()>;

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<P, S> AsymmetricKey<P, S> {
    /// Returns a reference to the public component.
    pub fn public(&self) -> &P {
        &self.public
    }

    /// Returns the public half of this key.
    pub fn public_key(&self) -> PubKey<P>
    where
        P: Clone,
    {
        PubKey {
            public: self.public.clone(),
            private: (),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl<P, S> From<&AsymmetricKey<P, S>> for PubKey<P>
where
    P: Clone,
{
    fn from(key: &AsymmetricKey<P, S>) -> Self {
        key.public_key()
    }
}
