//! Authentication handling for the JIRA API.
//!
//! JIRA Cloud uses Basic Auth with an account identifier (usually the
//! email address) and an API token. Credentials are supplied at client
//! construction and held in memory only; nothing is persisted.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Authentication credentials for JIRA.
#[derive(Clone)]
pub struct Auth {
    /// The account identifier (email address).
    identifier: String,
    /// The precomputed "Basic ..." authorization header value.
    auth_header: String,
}

impl Auth {
    /// Create new credentials from an identifier and API token.
    ///
    /// The token is encoded into the header immediately and the raw token
    /// is not stored.
    pub fn new(identifier: &str, token: &str) -> Self {
        let auth_header = build_auth_header(identifier, token);
        Self {
            identifier: identifier.to_string(),
            auth_header,
        }
    }

    /// Get the authorization header value for HTTP requests.
    pub fn header_value(&self) -> &str {
        &self.auth_header
    }

    /// Get the account identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The header value decodes back to the token; keep both out of logs.
        f.debug_struct("Auth")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Build the Basic Auth header value.
///
/// Encodes "identifier:token" in Base64 and prepends "Basic ".
fn build_auth_header(identifier: &str, token: &str) -> String {
    let credentials = format!("{}:{}", identifier, token);
    let encoded = BASE64.encode(credentials.as_bytes());
    format!("Basic {}", encoded)
}
