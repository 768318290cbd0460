//! The signed-in user as kept in the session.

use auth::oauth::TokenSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider tokens plus the raw profile API response, stored under the session's
/// `user` key. Its presence in a session means the sign-in completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserToken {
    #[serde(flatten)]
    pub token: TokenSet,
    #[serde(rename = "personData")]
    pub person_data: Value,
}

impl UserToken {
    pub fn new(token: TokenSet, person_data: Value) -> Self {
        Self { token, person_data }
    }
}
