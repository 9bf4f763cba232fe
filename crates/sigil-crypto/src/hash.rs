//! BLAKE3 digests.
//!
//! Used for credential digests held by user providers and for key
//! fingerprints.

use std::fmt;
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, CryptoResult};

/// A 32-byte BLAKE3 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Digest of `data`.
    #[must_use]
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest of `data` under a key-derivation `domain`.
    ///
    /// # Example
    ///
    /// ```
    /// use sigil_crypto::ContentHash;
    ///
    /// let hash = ContentHash::hash_with_domain("password", b"secret");
    /// assert_ne!(hash, ContentHash::hash(b"secret"));
    /// ```
    #[must_use]
    pub fn hash_with_domain(domain: &str, data: &[u8]) -> Self {
        Self(blake3::derive_key(domain, data))
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compare two digests in constant time.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }

    /// Lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse lowercase or uppercase hex.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] unless `s` is 64 hex digits.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| CryptoError::InvalidEncoding)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", hex::encode(&self.0[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(ContentHash::hash(b"hello"), ContentHash::hash(b"hello"));
        assert_ne!(ContentHash::hash(b"hello"), ContentHash::hash(b"world"));
    }

    #[test]
    fn test_matches() {
        let a = ContentHash::hash_with_domain("password", b"pw");

        assert!(a.matches(&ContentHash::hash_with_domain("password", b"pw")));
        assert!(!a.matches(&ContentHash::hash_with_domain("password", b"pw2")));
        assert!(!a.matches(&ContentHash::hash_with_domain("other", b"pw")));
    }

    #[test]
    fn test_hex() {
        let hash = ContentHash::hash(b"test");

        assert_eq!(ContentHash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert_eq!(
            ContentHash::from_hex(&hash.to_hex().to_uppercase()).unwrap(),
            hash
        );
        assert!(matches!(
            ContentHash::from_hex("abcd"),
            Err(CryptoError::InvalidEncoding)
        ));
    }
}
