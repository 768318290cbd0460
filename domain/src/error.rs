//! Error types for the `domain` layer.
use auth::error::{
    Error as AuthError, ErrorKind as AuthErrorKind, HttpErrorKind, OAuthErrorKind,
};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `auth`, and `web` is dependent on `domain`,
/// but `web` should not need to inspect `auth` errors directly. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes and messages.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Authorization(AuthorizationErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config,
    Session,
    Other(String),
}

/// Problems with where the user is in the sign-in flow.
#[derive(Debug, PartialEq)]
pub enum AuthorizationErrorKind {
    /// The callback's `state` does not belong to this session (CSRF).
    MismatchingState,
    /// A sign-in was started by a user who already holds a session.
    AlreadySignedIn,
    /// The provider refused or aborted the authorization.
    Denied,
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Status(u16),
    InvalidBody,
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        let error_kind = if err.is_builder() {
            DomainErrorKind::Internal(InternalErrorKind::Other(
                "Failed to build reqwest client".to_string(),
            ))
        } else if let Some(status) = err.status() {
            DomainErrorKind::External(ExternalErrorKind::Status(status.as_u16()))
        } else if err.is_decode() {
            DomainErrorKind::External(ExternalErrorKind::InvalidBody)
        // Errors that result from issues with the network call itself.
        } else {
            DomainErrorKind::External(ExternalErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

// This is where we translate errors from the `auth` layer to the `domain` layer.
impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        let error_kind = match &err.error_kind {
            AuthErrorKind::OAuth(OAuthErrorKind::InvalidState) => {
                DomainErrorKind::Authorization(AuthorizationErrorKind::MismatchingState)
            }
            AuthErrorKind::OAuth(OAuthErrorKind::AuthorizationFailed) => {
                DomainErrorKind::Authorization(AuthorizationErrorKind::Denied)
            }
            AuthErrorKind::OAuth(OAuthErrorKind::Configuration) | AuthErrorKind::Discovery(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Config)
            }
            AuthErrorKind::OAuth(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other("OAuth error".to_string()))
            }
            AuthErrorKind::IdToken(_) => DomainErrorKind::External(ExternalErrorKind::Other(
                "ID token rejected".to_string(),
            )),
            AuthErrorKind::Http(HttpErrorKind::Status(status)) => {
                DomainErrorKind::External(ExternalErrorKind::Status(*status))
            }
            AuthErrorKind::Http(HttpErrorKind::InvalidBody) => {
                DomainErrorKind::External(ExternalErrorKind::InvalidBody)
            }
            AuthErrorKind::Http(HttpErrorKind::BuilderFailed) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
            AuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
