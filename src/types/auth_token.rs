use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque session token issued by the backend on login or register.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthToken {
    /// The token string, exactly as issued.
    pub token: String,
}

impl AuthToken {
    /// Wraps a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns the token string.
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

// Tokens end up in logs via `{:?}`; keep them out.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_token() {
        let token = AuthToken::new("abc");
        assert_eq!(token.as_str(), "abc");
        assert!(!format!("{token:?}").contains("abc"));
    }
}
