use serde::{Deserialize, Serialize};

/// Credentials submitted to the login or register endpoint.
///
/// Created per submit and dropped once the request resolves.  `username` is only
/// present for registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Email address identifying the account.
    pub email: String,

    /// Display name chosen at registration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Plain-text password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials for a login request.
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: None,
            password: password.into(),
        }
    }

    /// Creates credentials for a register request.
    pub fn register(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: Some(username.into()),
            password: password.into(),
        }
    }

    /// Returns the name of the first required field that is empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if let Some(username) = &self.username
            && username.trim().is_empty()
        {
            return Some("username");
        }
        if self.email.trim().is_empty() {
            return Some("email");
        }
        if self.password.is_empty() {
            return Some("password");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_omits_username() {
        let creds = Credentials::login("a@b.com", "pw");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com", "password": "pw"}));
    }

    #[test]
    fn register_includes_username() {
        let creds = Credentials::register("ann", "a@b.com", "pw");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"email": "a@b.com", "username": "ann", "password": "pw"})
        );
    }

    #[test]
    fn missing_field_checks_presence_only() {
        assert_eq!(Credentials::login("a@b.com", "pw").missing_field(), None);
        assert_eq!(Credentials::login("", "pw").missing_field(), Some("email"));
        assert_eq!(Credentials::login("  ", "pw").missing_field(), Some("email"));
        assert_eq!(
            Credentials::login("a@b.com", "").missing_field(),
            Some("password")
        );
        assert_eq!(
            Credentials::register("", "a@b.com", "pw").missing_field(),
            Some("username")
        );
        // no format validation
        assert_eq!(Credentials::login("not-an-email", "x").missing_field(), None);
    }
}
