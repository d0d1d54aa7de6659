use sha2::{Digest, Sha256};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The size in bytes of the digests produced by this crate.
pub const DIGEST_SIZE: usize = 32;

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Computes the SHA-256 digest of the concatenation of all given parts.
///
/// The digest over `["ab", "c"]` equals the digest over `["a", "bc"]`; callers
/// that need unambiguous framing must length-prefix their parts themselves.
pub fn sha256_concat<I, T>(parts: I) -> [u8; DIGEST_SIZE]
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    hasher.finalize().into()
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_concat_is_concatenation() {
        let split = sha256_concat([&b"hello "[..], &b"world"[..]]);
        let whole = sha256_concat([&b"hello world"[..]]);
        assert_eq!(split, whole);
    }

    #[test]
    fn test_sha256_concat_empty_input() {
        // SHA-256 of the empty string.
        let digest = sha256_concat::<_, &[u8]>([]);
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
