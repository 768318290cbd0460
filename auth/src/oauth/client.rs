//! OAuth 2.0 client for the authorization code flow with PKCE.

use log::*;
use oauth2::basic::{
    BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
    BasicTokenType,
};
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RequestTokenError, Scope, StandardRevocableToken, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use url::Url;

use super::discovery::ProviderMetadata;
use super::id_token;
use super::token::{ProviderTokenResponse, TokenSet};
use crate::error::{oauth_error, Error, ErrorKind, HttpErrorKind, OAuthErrorKind};

type ProviderClient = oauth2::Client<
    BasicErrorResponse,
    ProviderTokenResponse,
    BasicTokenType,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
>;

const OPENID_SCOPE: &str = "openid";

/// Static client registration with the identity provider.
#[derive(Debug, Clone)]
pub struct Registration {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Data that must survive between the login redirect and the callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub state: String,
    pub pkce_verifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// Authorization request with URL and the data needed to complete it.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: Url,
    pub pending: PendingAuthorization,
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// OAuth client configured once from the registration and discovery metadata.
pub struct Client {
    inner: ProviderClient,
    metadata: ProviderMetadata,
    client_id: String,
    scopes: Vec<String>,
    http_client: reqwest::Client,
}

impl Client {
    /// Fetches the provider's discovery document and builds a client from it.
    pub async fn discover(registration: Registration, metadata_url: &str) -> Result<Self, Error> {
        let http_client = reqwest::Client::builder().use_rustls_tls().build()?;
        let metadata = ProviderMetadata::discover(&http_client, metadata_url).await?;
        Self::new(registration, metadata, http_client)
    }

    pub fn new(
        registration: Registration,
        metadata: ProviderMetadata,
        http_client: reqwest::Client,
    ) -> Result<Self, Error> {
        let mut inner = ProviderClient::new(
            ClientId::new(registration.client_id.clone()),
            Some(ClientSecret::new(registration.client_secret)),
            AuthUrl::new(metadata.authorization_endpoint.clone())?,
            Some(TokenUrl::new(metadata.token_endpoint.clone())?),
        )
        .set_redirect_uri(RedirectUrl::new(registration.redirect_uri)?);

        if metadata.requires_client_secret_post() {
            inner = inner.set_auth_type(AuthType::RequestBody);
        }

        Ok(Self {
            inner,
            metadata,
            client_id: registration.client_id,
            scopes: registration.scopes,
            http_client,
        })
    }

    pub fn metadata(&self) -> &ProviderMetadata {
        &self.metadata
    }

    fn requests_openid(&self) -> bool {
        self.scopes.iter().any(|s| s == OPENID_SCOPE)
    }

    /// Builds the provider consent URL with a fresh state, PKCE S256 challenge and,
    /// for OpenID scopes, a nonce.
    pub fn authorization_request(&self) -> AuthorizationRequest {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let nonce = self
            .requests_openid()
            .then(|| CsrfToken::new_random().secret().clone());

        let mut request = self
            .inner
            .authorize_url(CsrfToken::new_random)
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .set_pkce_challenge(pkce_challenge);
        if let Some(nonce) = &nonce {
            request = request.add_extra_param("nonce", nonce.clone());
        }
        let (url, state) = request.url();

        debug!("Built authorization request for {}", self.metadata.issuer);

        AuthorizationRequest {
            url,
            pending: PendingAuthorization {
                state: state.secret().clone(),
                pkce_verifier: pkce_verifier.secret().clone(),
                nonce,
            },
        }
    }

    /// Completes the flow: checks the returned state against `pending`, exchanges the
    /// code (with the PKCE verifier) and verifies the ID token if one is issued.
    pub async fn exchange_code(
        &self,
        params: &CallbackParams,
        pending: Option<PendingAuthorization>,
    ) -> Result<TokenSet, Error> {
        if let Some(error) = &params.error {
            warn!(
                "Provider returned authorization error {error}: {}",
                params.error_description.as_deref().unwrap_or_default()
            );
            return Err(oauth_error(OAuthErrorKind::AuthorizationFailed, error));
        }

        let pending = match pending {
            Some(pending) if params.state.as_deref() == Some(pending.state.as_str()) => pending,
            _ => {
                warn!("OAuth callback state does not match the state issued at login");
                return Err(oauth_error(
                    OAuthErrorKind::InvalidState,
                    "mismatching state",
                ));
            }
        };

        let code = params.code.as_ref().ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::AuthorizationFailed,
                "callback is missing the authorization code",
            )
        })?;

        debug!("Exchanging authorization code for tokens");

        let response = self
            .inner
            .exchange_code(AuthorizationCode::new(code.clone()))
            .set_pkce_verifier(PkceCodeVerifier::new(pending.pkce_verifier))
            .request_async(async_http_client)
            .await
            .map_err(token_exchange_error)?;

        let mut tokens = TokenSet::from(&response);

        if let Some(raw_id_token) = tokens.id_token.as_deref() {
            let claims = id_token::verify(
                &self.http_client,
                &self.metadata,
                &self.client_id,
                raw_id_token,
                pending.nonce.as_deref(),
            )
            .await?;
            tokens.userinfo = Some(claims);
        }

        info!("Successfully exchanged authorization code for tokens");
        Ok(tokens)
    }
}

fn token_exchange_error<RE>(err: RequestTokenError<RE, BasicErrorResponse>) -> Error
where
    RE: StdError + Send + Sync + 'static,
{
    let error_kind = match &err {
        RequestTokenError::Request(_) => ErrorKind::Http(HttpErrorKind::Network),
        RequestTokenError::Parse(..) => ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
        RequestTokenError::ServerResponse(_) | RequestTokenError::Other(_) => {
            ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed)
        }
    };
    warn!("Token exchange failed: {err}");

    Error {
        source: Some(Box::new(err)),
        error_kind,
    }
}
