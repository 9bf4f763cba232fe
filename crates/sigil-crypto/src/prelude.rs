//! Prelude module - commonly used types for convenient import.
//!
//! Use `use sigil_crypto::prelude::*;` to import all essential types.
//!
//! # Example
//!
//! ```rust
//! use sigil_crypto::prelude::*;
//!
//! let keypair = KeyPair::derive_from_secret(b"secret");
//! let signature = keypair.sign(b"hello");
//! assert!(keypair.verify(b"hello", &signature).is_ok());
//!
//! let digest = ContentHash::hash_with_domain("password", b"hunter2");
//! assert!(digest.matches(&ContentHash::hash_with_domain("password", b"hunter2")));
//! ```

// Errors
pub use crate::{CryptoError, CryptoResult};

// Keys and signatures
pub use crate::{KeyPair, Signature};

// Encoding
pub use crate::Alphabet;

// Hashing
pub use crate::ContentHash;
