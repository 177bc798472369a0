use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Email carried by the placeholder session when the backend runs without authentication.
pub const NO_AUTH_USER_EMAIL: &str = "keep";

/// Authentication mode of the backend, as reported by `/api/config`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AuthType {
    #[default]
    NoAuth,
    SingleTenant,
    MultiTenant,
    Other(String),
}

impl AuthType {
    pub fn as_str(&self) -> &str {
        match self {
            AuthType::NoAuth => "NO_AUTH",
            AuthType::SingleTenant => "SINGLE_TENANT",
            AuthType::MultiTenant => "MULTI_TENANT",
            AuthType::Other(raw) => raw,
        }
    }
}

impl FromStr for AuthType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "NO_AUTH" => AuthType::NoAuth,
            "SINGLE_TENANT" => AuthType::SingleTenant,
            "MULTI_TENANT" => AuthType::MultiTenant,
            other => AuthType::Other(other.to_string()),
        })
    }
}

impl From<String> for AuthType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(auth_type) => auth_type,
            Err(never) => match never {},
        }
    }
}

impl From<AuthType> for String {
    fn from(value: AuthType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The signed-in user on whose behalf screens talk to the backend.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: String,
    pub email: Option<String>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Email suitable for identifying the user to analytics, if any.
    pub fn identity(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|email| !email.is_empty() && *email != NO_AUTH_USER_EMAIL)
    }
}
