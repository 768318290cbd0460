//! Controller for the Google sign-in flow.
//!
//! Both endpoints are reached through browser redirects: the user follows the login link,
//! and Google sends the user back to the callback with `code` and `state`.

use crate::controller::found;
use crate::extractors::user_session::UserSession;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use domain::{sign_in, CallbackParams};
use log::*;

/// GET /google-login
///
/// Redirects an anonymous user to Google's authorization endpoint. The state, nonce and
/// PKCE verifier are kept in the session for the callback. Returns 404 when already
/// signed in.
pub async fn login(
    State(app_state): State<AppState>,
    mut session: UserSession,
) -> Result<impl IntoResponse, Error> {
    let request = sign_in::begin(app_state.oauth_client(), session.user())?;

    session.set_pending_authorization(request.pending);

    debug!("Redirecting to authorization endpoint");
    Ok((session, found(request.url.as_str())))
}

/// GET /signin-google
///
/// Completes sign-in: checks `state` against the session, exchanges the code, fetches the
/// profile and stores the result as the session's `user`. The pending authorization is
/// cleared from the cookie whether or not sign-in succeeds.
pub async fn callback(
    State(app_state): State<AppState>,
    mut session: UserSession,
    Query(params): Query<CallbackParams>,
) -> Response {
    let pending = session.take_pending_authorization();

    let result = sign_in::complete(
        app_state.oauth_client(),
        app_state.people_client(),
        &params,
        pending,
    )
    .await;

    match result {
        Ok(user) => {
            session.set_user(user);
            (session, found("/")).into_response()
        }
        Err(err) => (session, Error::from(err)).into_response(),
    }
}
