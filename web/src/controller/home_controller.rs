use crate::error::Error;
use crate::extractors::user_session::UserSession;
use crate::response::home_page;
use axum::response::Html;
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};

/// GET /
///
/// Shows the session's `user` entry when signed in, otherwise a link to start sign-in.
pub async fn index(session: UserSession) -> Result<Html<String>, Error> {
    let page = home_page::render(session.user()).map_err(|e| {
        Error::from(DomainError {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to render session contents".to_string(),
            )),
        })
    })?;

    Ok(Html(page))
}
