//! HTTP surface of the sign-in app: routes, controllers, the typed session wrapper and the
//! mapping from domain errors to responses.

use std::sync::Arc;

use axum::extract::FromRef;
use domain::gateway::people::PeopleClient;
use domain::{OAuthClient, Registration};
use log::*;
use service::config::Config;
use tokio::net::TcpListener;

pub use self::error::{Error, Result};
pub use self::extractors::user_session::SessionSettings;

mod controller;
pub mod error;
mod extractors;
mod response;
pub mod router;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    oauth_client: Arc<OAuthClient>,
    people_client: Arc<PeopleClient>,
    session_settings: SessionSettings,
}

impl AppState {
    pub fn new(config: Config, oauth_client: OAuthClient, people_client: PeopleClient) -> Self {
        let session_settings = SessionSettings::new(
            config.session_secret(),
            config.is_production(),
            config.session_expiry_seconds,
        );
        Self {
            config,
            oauth_client: Arc::new(oauth_client),
            people_client: Arc::new(people_client),
            session_settings,
        }
    }

    /// Discovers the identity provider and builds the outbound clients. Fails when the
    /// discovery document cannot be fetched or does not support PKCE S256.
    pub async fn init(config: Config) -> Result<Self> {
        let registration = Registration {
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().to_string(),
            redirect_uri: format!("{}{}", config.external_url(), router::CALLBACK_PATH),
            scopes: config.scopes.clone(),
        };
        info!("Redirect URI: {}", registration.redirect_uri);

        let oauth_client = OAuthClient::discover(registration, config.metadata_url()).await?;
        debug!(
            "Authorization endpoint: {}",
            oauth_client.metadata().authorization_endpoint
        );
        let people_client = PeopleClient::new(config.profile_api_url())?;

        Ok(Self::new(config, oauth_client, people_client))
    }

    pub fn oauth_client(&self) -> &OAuthClient {
        &self.oauth_client
    }

    pub fn people_client(&self) -> &PeopleClient {
        &self.people_client
    }
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface.clone();
    let port = app_state.config.port;
    let listener = TcpListener::bind((host.as_str(), port)).await?;

    info!("Server starting... listening for connections on http://{host}:{port}");
    axum::serve(listener, router::define_routes(app_state)).await
}

impl FromRef<AppState> for SessionSettings {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.session_settings.clone()
    }
}
