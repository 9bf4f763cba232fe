//! Detached signatures carried by issued tokens.

use ed25519_dalek::{Signature as DalekSignature, VerifyingKey};
use std::fmt;

use crate::error::{CryptoError, CryptoResult};

/// An Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; Signature::LENGTH]);

impl Signature {
    /// Length in bytes.
    pub const LENGTH: usize = 64;

    /// Signature decoded from a token.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignatureLength`] unless `slice` holds
    /// exactly [`Signature::LENGTH`] bytes.
    pub fn try_from_slice(slice: &[u8]) -> CryptoResult<Self> {
        let bytes: [u8; Self::LENGTH] =
            slice
                .try_into()
                .map_err(|_| CryptoError::InvalidSignatureLength {
                    expected: Self::LENGTH,
                    actual: slice.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LENGTH] {
        &self.0
    }

    /// Strict verification; malleated signatures are rejected.
    pub(crate) fn verify(&self, message: &[u8], key: &VerifyingKey) -> CryptoResult<()> {
        key.verify_strict(message, &DalekSignature::from_bytes(&self.0))
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..8]))
    }
}

impl From<DalekSignature> for Signature {
    fn from(sig: DalekSignature) -> Self {
        Self(sig.to_bytes())
    }
}
