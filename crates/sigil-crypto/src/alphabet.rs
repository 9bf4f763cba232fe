//! Seeded transport alphabet for token encoding.
//!
//! Tokens travel through query strings, headers and cookies, so every symbol
//! is drawn from the URL-safe base64 set and no padding is emitted. A
//! deployment may supply a seed; the 64 symbols are then permuted with a
//! ChaCha20 stream keyed from that seed, giving a deployment-specific but
//! fully deterministic alphabet.

use base64::Engine;
use base64::engine::general_purpose::{GeneralPurpose, NO_PAD};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;
use std::fmt;

use crate::error::{CryptoError, CryptoResult};

/// The unpermuted URL-safe symbol set.
const URL_SAFE_SYMBOLS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Domain separation context for turning a seed into a permutation key.
const ALPHABET_SEED_CONTEXT: &str = "sigil 2024-06 token alphabet seed v1";

/// A 64-symbol, URL-safe encoding alphabet.
#[derive(Clone)]
pub struct Alphabet {
    symbols: String,
    engine: GeneralPurpose,
}

impl Alphabet {
    /// The unpermuted URL-safe alphabet.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            symbols: URL_SAFE_SYMBOLS.to_owned(),
            engine: GeneralPurpose::new(&base64::alphabet::URL_SAFE, NO_PAD),
        }
    }

    /// Build the alphabet permuted by `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidAlphabet`] if the permuted symbols are
    /// rejected by the encoder (cannot happen for a permutation of the
    /// URL-safe set, but the encoder API is fallible).
    pub fn seeded(seed: &[u8]) -> CryptoResult<Self> {
        let mut symbols: Vec<u8> = URL_SAFE_SYMBOLS.bytes().collect();
        let mut rng = ChaCha20Rng::from_seed(blake3::derive_key(ALPHABET_SEED_CONTEXT, seed));
        symbols.shuffle(&mut rng);

        let symbols = String::from_utf8(symbols)
            .map_err(|e| CryptoError::InvalidAlphabet(e.to_string()))?;
        let alphabet = base64::alphabet::Alphabet::new(&symbols)
            .map_err(|e| CryptoError::InvalidAlphabet(e.to_string()))?;

        Ok(Self {
            engine: GeneralPurpose::new(&alphabet, NO_PAD),
            symbols,
        })
    }

    /// Standard alphabet when `seed` is `None`, seeded otherwise.
    ///
    /// # Errors
    ///
    /// See [`Alphabet::seeded`].
    pub fn from_seed(seed: Option<&[u8]>) -> CryptoResult<Self> {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Ok(Self::standard()),
        }
    }

    /// The 64 symbols in encoding order.
    #[must_use]
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    /// Encode bytes without padding.
    #[must_use]
    pub fn encode(&self, bytes: &[u8]) -> String {
        self.engine.encode(bytes)
    }

    /// Decode a string produced by [`Alphabet::encode`].
    ///
    /// Non-canonical trailing bits are rejected, so every distinct string
    /// decodes to distinct bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidEncoding`] on any foreign symbol,
    /// padding, or invalid length.
    pub fn decode(&self, encoded: &str) -> CryptoResult<Vec<u8>> {
        self.engine
            .decode(encoded)
            .map_err(|_| CryptoError::InvalidEncoding)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet").field(&self.symbols).finish()
    }
}
