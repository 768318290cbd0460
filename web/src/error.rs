use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{AuthorizationErrorKind, DomainErrorKind, Error as DomainError, ExternalErrorKind};
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

const MISMATCHING_STATE: &str = "Error: CSRF Warning! Mismatching state.";

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    // What failed on the outbound call, for the response body.
    fn upstream_detail(&self) -> String {
        match &self.0.source {
            Some(source) => source.to_string(),
            None => format!("{:?}", self.0.error_kind),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self.0.error_kind {
            DomainErrorKind::Authorization(authorization_error_kind) => {
                match authorization_error_kind {
                    AuthorizationErrorKind::MismatchingState => {
                        warn!("Rejected callback with mismatching state");
                        (StatusCode::BAD_REQUEST, MISMATCHING_STATE).into_response()
                    }
                    AuthorizationErrorKind::AlreadySignedIn => {
                        (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                    }
                    AuthorizationErrorKind::Denied => {
                        warn!("Authorization was not granted: {:?}", self.0);
                        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                    }
                }
            }
            DomainErrorKind::External(external_error_kind) => match external_error_kind {
                ExternalErrorKind::Network
                | ExternalErrorKind::Status(_)
                | ExternalErrorKind::InvalidBody => {
                    let detail = self.upstream_detail();
                    error!("Outbound API call failed: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Error during API call: {detail}"),
                    )
                        .into_response()
                }
                ExternalErrorKind::Other(_) => {
                    error!("External error: {:?}", self.0);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            DomainErrorKind::Internal(_) => {
                error!("Internal error: {:?}", self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
            }
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
