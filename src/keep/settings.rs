use crate::auth::AuthType;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone)]
pub struct ApiKeyResponse {
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// Runtime configuration served at `/api/config`
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RuntimeConfig {
    #[serde(rename = "AUTH_TYPE", default)]
    pub auth_type: AuthType,
}
