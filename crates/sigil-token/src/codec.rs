//! Token creation and validation.
//!
//! Wire format: `<payload>.<signature>`. The payload is the JSON claim set
//! and the signature is Ed25519 over the encoded payload; both parts use the
//! deployment's transport alphabet.

use chrono::Utc;
use sigil_config::SigningSection;
use sigil_crypto::{Alphabet, KeyPair, Signature};
use tracing::debug;

use crate::claims::{Claims, Subject, TokenContext};
use crate::error::{TokenError, TokenResult};

/// Creates and parses tokens with the process-wide signing key.
///
/// Build one at startup and share it; it holds no per-request state.
#[derive(Debug)]
pub struct TokenCodec {
    keypair: KeyPair,
    alphabet: Alphabet,
}

impl TokenCodec {
    /// Codec from explicit key material.
    #[must_use]
    pub fn new(keypair: KeyPair, alphabet: Alphabet) -> Self {
        Self { keypair, alphabet }
    }

    /// Codec keyed by `secret`, with the alphabet permuted by `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Crypto`] if the alphabet cannot be built.
    pub fn from_secret(secret: &[u8], seed: Option<&[u8]>) -> TokenResult<Self> {
        Ok(Self::new(
            KeyPair::derive_from_secret(secret),
            Alphabet::from_seed(seed)?,
        ))
    }

    /// Codec from the `[signing]` configuration section.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::from_secret`].
    pub fn from_config(section: &SigningSection) -> TokenResult<Self> {
        Self::from_secret(
            section.secret.as_bytes(),
            section.seed.as_deref().map(str::as_bytes),
        )
    }

    /// Create a token for `subject` that expires `expires_in` seconds from now.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::create_at`].
    pub fn create(
        &self,
        subject: &Subject,
        expires_in: u64,
        ctx: &TokenContext,
    ) -> TokenResult<String> {
        self.create_at(subject, expires_in, ctx, Utc::now().timestamp())
    }

    /// Create a token as if the current time were `now` (unix seconds).
    ///
    /// Issuer and audience are both the serving host.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidLifetime`] if `expires_in` is zero or
    /// overflows, and [`TokenError::Serialization`] if the subject cannot be
    /// encoded.
    pub fn create_at(
        &self,
        subject: &Subject,
        expires_in: u64,
        ctx: &TokenContext,
        now: i64,
    ) -> TokenResult<String> {
        Ok(self.issue_at(subject, expires_in, ctx, now)?.0)
    }

    /// Create a token and return it with its claim set.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::create_at`].
    pub fn issue_at(
        &self,
        subject: &Subject,
        expires_in: u64,
        ctx: &TokenContext,
        now: i64,
    ) -> TokenResult<(String, Claims)> {
        if expires_in == 0 {
            return Err(TokenError::InvalidLifetime);
        }
        let exp = i64::try_from(expires_in)
            .ok()
            .and_then(|secs| now.checked_add(secs))
            .ok_or(TokenError::InvalidLifetime)?;

        let claims = Claims {
            iss: ctx.host().to_owned(),
            aud: ctx.host().to_owned(),
            iat: now,
            exp,
            sub: subject.clone(),
        };

        let payload = self.alphabet.encode(&serde_json::to_vec(&claims)?);
        let signature = self.keypair.sign(payload.as_bytes());
        let token = format!("{payload}.{}", self.alphabet.encode(signature.as_bytes()));

        Ok((token, claims))
    }

    /// Validate `raw` and return its subject.
    ///
    /// # Errors
    ///
    /// See [`TokenCodec::parse_at`].
    pub fn parse(&self, raw: &str, ctx: &TokenContext) -> TokenResult<Subject> {
        self.parse_at(raw, ctx, Utc::now().timestamp())
    }

    /// Validate `raw` as if the current time were `now` and return its
    /// subject.
    ///
    /// Checks run in a fixed order: signature, then issuer and audience,
    /// then expiry.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Invalid`] on malformed encoding or a bad signature
    /// - [`TokenError::AudienceMismatch`] if issuer or audience disagree with
    ///   `ctx`
    /// - [`TokenError::Expired`] if `now > exp`
    pub fn parse_at(&self, raw: &str, ctx: &TokenContext, now: i64) -> TokenResult<Subject> {
        let claims = self.verify(raw)?;

        let expected_issuer = ctx.expected_issuer();
        if claims.iss != expected_issuer {
            debug!(expected = expected_issuer, actual = %claims.iss, "token rejected: issuer");
            return Err(TokenError::AudienceMismatch {
                expected: expected_issuer.to_owned(),
                actual: claims.iss,
            });
        }
        if claims.aud != ctx.host() {
            debug!(expected = ctx.host(), actual = %claims.aud, "token rejected: audience");
            return Err(TokenError::AudienceMismatch {
                expected: ctx.host().to_owned(),
                actual: claims.aud,
            });
        }

        if now > claims.exp {
            debug!(expires_at = claims.exp, now, "token rejected: expired");
            return Err(TokenError::Expired {
                expires_at: claims.exp,
            });
        }

        Ok(claims.sub)
    }

    /// Check the signature and decode the claim set, without host or
    /// expiry checks.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] on any encoding or signature failure.
    pub fn verify(&self, raw: &str) -> TokenResult<Claims> {
        let invalid = |reason: &'static str| {
            debug!(reason, "token rejected: invalid");
            TokenError::Invalid
        };

        let (payload, signature) = raw.split_once('.').ok_or_else(|| invalid("no separator"))?;

        let signature = self
            .alphabet
            .decode(signature)
            .ok()
            .and_then(|bytes| Signature::try_from_slice(&bytes).ok())
            .ok_or_else(|| invalid("signature encoding"))?;
        self.keypair
            .verify(payload.as_bytes(), &signature)
            .map_err(|_| invalid("signature mismatch"))?;

        let bytes = self
            .alphabet
            .decode(payload)
            .map_err(|_| invalid("payload encoding"))?;
        let claims: Claims =
            serde_json::from_slice(&bytes).map_err(|_| invalid("claim structure"))?;

        if claims.exp <= claims.iat {
            return Err(invalid("expiry not after issue time"));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000;

    fn codec() -> TokenCodec {
        TokenCodec::from_secret(b"test secret", Some(b"test seed")).unwrap()
    }

    fn ctx() -> TokenContext {
        TokenContext::new("app.test")
    }

    fn subject() -> Subject {
        json!({"id": 42, "name": "Ada", "roles": ["admin"]})
            .as_object()
            .unwrap()
            .clone()
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();
        let token = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();

        assert_eq!(codec.parse_at(&token, &ctx(), NOW).unwrap(), subject());
    }

    #[test]
    fn test_token_is_transport_safe() {
        let token = codec().create_at(&subject(), 60, &ctx(), NOW).unwrap();

        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        );
        assert_eq!(token.matches('.').count(), 1);
    }

    #[test]
    fn test_expiry_boundary() {
        let codec = codec();
        let token = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();
        let exp = NOW + 60;

        assert!(codec.parse_at(&token, &ctx(), exp).is_ok());
        assert!(matches!(
            codec.parse_at(&token, &ctx(), exp + 1),
            Err(TokenError::Expired { expires_at }) if expires_at == exp
        ));
    }

    #[test]
    fn test_zero_lifetime_rejected() {
        assert!(matches!(
            codec().create_at(&subject(), 0, &ctx(), NOW),
            Err(TokenError::InvalidLifetime)
        ));
        assert!(matches!(
            codec().create_at(&subject(), u64::MAX, &ctx(), NOW),
            Err(TokenError::InvalidLifetime)
        ));
    }

    #[test]
    fn test_single_character_flips_are_rejected() {
        let codec = codec();
        let token = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();

        for (i, original) in token.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut tampered = token.clone();
            tampered.replace_range(i..=i, &replacement.to_string());

            assert!(
                matches!(
                    codec.parse_at(&tampered, &ctx(), NOW),
                    Err(TokenError::Invalid)
                ),
                "flip at {i} was accepted"
            );
        }
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = codec().create_at(&subject(), 60, &ctx(), NOW).unwrap();
        let other = TokenCodec::from_secret(b"other secret", Some(b"test seed")).unwrap();

        assert!(matches!(
            other.parse_at(&token, &ctx(), NOW),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_other_seed_rejected() {
        let token = codec().create_at(&subject(), 60, &ctx(), NOW).unwrap();
        let other = TokenCodec::from_secret(b"test secret", Some(b"other seed")).unwrap();

        assert!(matches!(
            other.parse_at(&token, &ctx(), NOW),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_audience_mismatch() {
        let codec = codec();
        let token = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();

        let err = codec
            .parse_at(&token, &TokenContext::new("evil.test"), NOW)
            .unwrap_err();
        assert!(matches!(
            err,
            TokenError::AudienceMismatch { ref expected, ref actual }
                if expected == "evil.test" && actual == "app.test"
        ));
    }

    #[test]
    fn test_issuer_from_flow_server() {
        let codec = codec();
        let issued = codec
            .create_at(&subject(), 60, &TokenContext::new("accounts.test"), NOW)
            .unwrap();
        let local = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();
        let flow = ctx().with_issuer("https://accounts.test");

        // Issued elsewhere for another audience.
        assert!(matches!(
            codec.parse_at(&issued, &flow, NOW),
            Err(TokenError::AudienceMismatch { ref expected, .. }) if expected == "app.test"
        ));
        // Issued locally, but the flow server is expected.
        assert!(matches!(
            codec.parse_at(&local, &flow, NOW),
            Err(TokenError::AudienceMismatch { ref expected, .. }) if expected == "accounts.test"
        ));
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let codec = codec();
        let token = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();
        let tampered = format!("{token}x");

        assert!(matches!(
            codec.parse_at(&tampered, &TokenContext::new("evil.test"), NOW + 3600),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_mismatch_checked_before_expiry() {
        let codec = codec();
        let token = codec.create_at(&subject(), 60, &ctx(), NOW).unwrap();

        assert!(matches!(
            codec.parse_at(&token, &TokenContext::new("evil.test"), NOW + 3600),
            Err(TokenError::AudienceMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let codec = codec();
        for raw in ["", ".", "abc", "abc.def", "a.b.c", "Bearer xyz"] {
            assert!(
                matches!(codec.parse_at(raw, &ctx(), NOW), Err(TokenError::Invalid)),
                "{raw:?} was accepted"
            );
        }
    }

    #[test]
    fn test_issue_returns_claims() {
        let (token, claims) = codec().issue_at(&subject(), 90, &ctx(), NOW).unwrap();

        assert_eq!(codec().verify(&token).unwrap(), claims);
        assert_eq!(claims.iss, "app.test");
        assert_eq!(claims.aud, "app.test");
        assert_eq!(claims.exp - claims.iat, 90);
    }

    #[test]
    fn test_from_config() {
        let section = SigningSection {
            secret: "test secret".to_owned(),
            seed: Some("test seed".to_owned()),
        };
        let from_config = TokenCodec::from_config(&section).unwrap();
        let token = codec().create_at(&subject(), 60, &ctx(), NOW).unwrap();

        assert!(from_config.parse_at(&token, &ctx(), NOW).is_ok());
    }
}
