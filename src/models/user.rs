use serde::{Deserialize, Serialize};

/// Public view of an account; the password hash never leaves the repository
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
}
