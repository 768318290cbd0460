//! The sign-in flow: anonymous -> (login redirect) -> (callback) -> signed in.

use crate::error::{AuthorizationErrorKind, DomainErrorKind, Error};
use crate::gateway::people::PeopleClient;
use crate::user::UserToken;
use auth::oauth::{AuthorizationRequest, CallbackParams, Client, PendingAuthorization};
use log::*;

/// Starts a sign-in. Only an anonymous session may start one.
pub fn begin(oauth: &Client, current_user: Option<&UserToken>) -> Result<AuthorizationRequest, Error> {
    if current_user.is_some() {
        warn!("Sign-in requested by a session that is already signed in");
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::Authorization(AuthorizationErrorKind::AlreadySignedIn),
        });
    }

    Ok(oauth.authorization_request())
}

/// Finishes a sign-in from the provider's callback: validates state, exchanges the code,
/// then fetches the profile with the new access token. Each call is attempted once.
pub async fn complete(
    oauth: &Client,
    people: &PeopleClient,
    params: &CallbackParams,
    pending: Option<PendingAuthorization>,
) -> Result<UserToken, Error> {
    let token = oauth.exchange_code(params, pending).await?;
    let person_data = people.fetch_profile(&token.access_token).await?;

    info!("Sign-in completed");
    Ok(UserToken::new(token, person_data))
}
