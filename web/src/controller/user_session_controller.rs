use crate::controller::found;
use crate::extractors::user_session::UserSession;
use axum::response::IntoResponse;
use log::*;

/// GET /logout
///
/// Drops the signed-in user from the session. Safe to call when not signed in.
pub async fn logout(mut session: UserSession) -> impl IntoResponse {
    session.remove_user();

    info!("User signed out");
    (session, found("/"))
}
