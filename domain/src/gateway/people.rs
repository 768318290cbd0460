//! Google People API client.
//!
//! Fetches the signed-in user's profile fields (genders, birthdays) with the access
//! token obtained during sign-in. The response body is kept verbatim.

use crate::error::Error;
use log::*;
use serde_json::Value;

/// People API client bound to a single profile endpoint.
pub struct PeopleClient {
    client: reqwest::Client,
    profile_url: String,
}

impl PeopleClient {
    pub fn new(profile_url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            profile_url: profile_url.to_string(),
        })
    }

    /// Calls the profile endpoint as the user. Any non-2xx status is an error.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<Value, Error> {
        debug!("Fetching profile from {}", self.profile_url);

        let response = self
            .client
            .get(&self.profile_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call profile API: {e:?}");
                Error::from(e)
            })?;

        let response = response.error_for_status().map_err(|e| {
            warn!("Profile API returned an error status: {e}");
            Error::from(e)
        })?;

        let profile: Value = response.json().await.map_err(|e| {
            warn!("Failed to parse profile API response: {e:?}");
            Error::from(e)
        })?;

        info!("Fetched profile data for signed-in user");
        Ok(profile)
    }
}
