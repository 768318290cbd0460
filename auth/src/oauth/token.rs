//! Token set returned by a successful authorization code exchange.

use chrono::Utc;
use oauth2::basic::BasicTokenType;
use oauth2::{ExtraTokenFields, StandardTokenResponse, TokenResponse};
use serde::{Deserialize, Serialize};

use super::id_token::IdTokenClaims;

/// Token response fields beyond the OAuth 2.0 standard ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdTokenFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl ExtraTokenFields for IdTokenFields {}

pub(crate) type ProviderTokenResponse = StandardTokenResponse<IdTokenFields, BasicTokenType>;

/// Tokens issued by the provider, in the shape they are kept in the user's session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Absolute expiry as UNIX seconds, computed when the token was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Claims of the verified ID token, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo: Option<IdTokenClaims>,
}

impl From<&ProviderTokenResponse> for TokenSet {
    fn from(response: &ProviderTokenResponse) -> Self {
        let expires_in = response.expires_in().map(|d| d.as_secs());
        let now = Utc::now().timestamp();
        let scope = response.scopes().map(|scopes| {
            scopes
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        });

        TokenSet {
            access_token: response.access_token().secret().clone(),
            token_type: response.token_type().as_ref().to_string(),
            expires_in,
            // Left unset when the provider's lifetime does not fit a timestamp.
            expires_at: expires_in
                .and_then(|secs| i64::try_from(secs).ok().and_then(|s| now.checked_add(s))),
            refresh_token: response.refresh_token().map(|t| t.secret().clone()),
            scope,
            id_token: response.extra_fields().id_token.clone(),
            userinfo: None,
        }
    }
}
