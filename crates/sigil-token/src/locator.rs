//! Credential lookup across request channels.

use sigil_config::TokenSection;

use crate::request::CredentialSource;

/// Server variables consulted when the configured header is absent.
const FALLBACK_SERVER_VARS: [&str; 2] = ["HTTP_AUTHORIZATION", "REDIRECT_HTTP_AUTHORIZATION"];

/// Finds the raw credential on a request.
///
/// Channels are tried in a fixed order and the first non-empty value wins:
/// query parameter, body field, header, cookie, basic-auth password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenLocator {
    key: String,
    prefix: String,
    cookie: String,
}

impl TokenLocator {
    /// Locator using `key` for query, body and header lookups.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        prefix: impl Into<String>,
        cookie: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            prefix: prefix.into(),
            cookie: cookie.into(),
        }
    }

    /// Locator from the `[token]` configuration section.
    #[must_use]
    pub fn from_config(section: &TokenSection) -> Self {
        Self::new(&section.key, &section.prefix, &section.cookie)
    }

    /// Name of the cookie the credential is read from.
    #[must_use]
    pub fn cookie_name(&self) -> &str {
        &self.cookie
    }

    /// The raw credential, or an empty string when none is present.
    #[must_use]
    pub fn locate<R: CredentialSource + ?Sized>(&self, request: &R) -> String {
        let found = non_empty(request.query(&self.key).map(str::to_owned))
            .or_else(|| non_empty(request.input(&self.key).map(str::to_owned)))
            .or_else(|| non_empty(self.from_header(request)))
            .or_else(|| non_empty(request.cookie(&self.cookie).map(str::to_owned)))
            .or_else(|| non_empty(request.basic_password()));

        found.unwrap_or_default()
    }

    /// The credential carried by the header channel.
    ///
    /// The prefix is located by its last case-insensitive occurrence; the
    /// remainder is cut at the first comma and trimmed. An empty prefix takes
    /// the whole header value.
    #[must_use]
    pub fn from_header<R: CredentialSource + ?Sized>(&self, request: &R) -> Option<String> {
        let header = non_empty(request.header(&self.key).map(str::to_owned)).or_else(|| {
            FALLBACK_SERVER_VARS
                .iter()
                .find_map(|var| non_empty(request.server_var(var).map(str::to_owned)))
        })?;

        let rest = if self.prefix.is_empty() {
            header.as_str()
        } else {
            let position = header
                .to_ascii_lowercase()
                .rfind(&self.prefix.to_ascii_lowercase())?;
            header.get(position.saturating_add(self.prefix.len())..)?
        };
        let rest = rest.split_once(',').map_or(rest, |(first, _)| first);

        Some(rest.trim().to_owned())
    }
}

impl Default for TokenLocator {
    fn default() -> Self {
        Self::from_config(&TokenSection::default())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
