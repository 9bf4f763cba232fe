//! The process-wide token signing key.
//!
//! Deployments configure a secret string of any length. The Ed25519 signing
//! key is derived from it with BLAKE3 key derivation, so the raw secret never
//! doubles as key material.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoResult;
use crate::hash::ContentHash;
use crate::signature::Signature;

const SIGNING_KEY_CONTEXT: &str = "sigil 2024-06 token signing key v1";

/// Signing and verifying halves of the token key.
///
/// The signing half is zeroized on drop.
#[derive(ZeroizeOnDrop)]
pub struct KeyPair {
    #[zeroize(skip)]
    verifying_key: VerifyingKey,
    signing_key: SigningKey,
}

impl KeyPair {
    /// Derive the key pair from `secret`.
    ///
    /// The same secret always yields the same key pair.
    #[must_use]
    pub fn derive_from_secret(secret: &[u8]) -> Self {
        let mut seed = blake3::derive_key(SIGNING_KEY_CONTEXT, secret);
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();

        Self {
            verifying_key: signing_key.verifying_key(),
            signing_key,
        }
    }

    /// Short hex fingerprint of the verifying key, safe to log.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hex = ContentHash::hash(self.verifying_key.as_bytes()).to_hex();
        hex.truncate(16);
        hex
    }

    /// Sign `message`.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::from(self.signing_key.sign(message))
    }

    /// Check a signature made by this key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CryptoError::SignatureVerificationFailed`] if the
    /// signature does not match.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> CryptoResult<()> {
        signature.verify(message, &self.verifying_key)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("fingerprint", &self.fingerprint())
            .finish_non_exhaustive()
    }
}
