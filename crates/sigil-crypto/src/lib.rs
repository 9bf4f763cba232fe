//! Sigil Crypto - Cryptographic primitives for the sigil token engine.
//!
//! This crate provides:
//! - Ed25519 signing keys derived from the process-wide secret
//! - Detached signatures carried by every issued token
//! - A seeded, URL-safe transport alphabet for token encoding
//! - BLAKE3 content hashing for credential digests
//!
//! # Integrity vs. obfuscation
//!
//! The signature is the integrity guarantee. The seeded alphabet only changes
//! how the bytes look on the wire; two deployments with different seeds cannot
//! read each other's tokens, but that is a side effect, not a security property.
//!
//! # Example
//!
//! ```
//! use sigil_crypto::{Alphabet, KeyPair};
//!
//! let keypair = KeyPair::derive_from_secret(b"base64:app-key");
//! let alphabet = Alphabet::seeded(b"deployment-seed").unwrap();
//!
//! let payload = alphabet.encode(b"claims");
//! let signature = keypair.sign(payload.as_bytes());
//!
//! assert!(keypair.verify(payload.as_bytes(), &signature).is_ok());
//! assert_eq!(alphabet.decode(&payload).unwrap(), b"claims");
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod alphabet;
mod error;
mod hash;
mod keypair;
mod signature;

pub use alphabet::Alphabet;
pub use error::{CryptoError, CryptoResult};
pub use hash::ContentHash;
pub use keypair::KeyPair;
pub use signature::Signature;
