//! Error types for the `auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for the auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Discovery(DiscoveryErrorKind),
    OAuth(OAuthErrorKind),
    IdToken(IdTokenErrorKind),
    Http(HttpErrorKind),
}

/// Errors from reading the provider's discovery document.
#[derive(Debug, PartialEq)]
pub enum DiscoveryErrorKind {
    InvalidMetadata,
    UnsupportedPkceMethod,
}

/// Errors from OAuth operations.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// The provider redirected back with an `error` parameter or without a code.
    AuthorizationFailed,
    /// The returned `state` does not match the one issued at login.
    InvalidState,
    TokenExchangeFailed,
    InvalidResponse,
    Configuration,
}

/// Errors from ID token verification.
#[derive(Debug, PartialEq)]
pub enum IdTokenErrorKind {
    KeyNotFound,
    InvalidToken,
    NonceMismatch,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
    InvalidBody,
    Status(u16),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Discovery(kind) => write!(f, "Discovery error: {:?}", kind)?,
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind)?,
            ErrorKind::IdToken(kind) => write!(f, "ID token error: {:?}", kind)?,
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind)?,
        }
        match &self.source {
            Some(source) => write!(f, ": {source}"),
            None => Ok(()),
        }
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
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if let Some(status) = err.status() {
            ErrorKind::Http(HttpErrorKind::Status(status.as_u16()))
        } else if err.is_decode() {
            ErrorKind::Http(HttpErrorKind::InvalidBody)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::Configuration),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::IdToken(IdTokenErrorKind::InvalidToken),
        }
    }
}

/// Helper function to create discovery errors.
pub fn discovery_error(kind: DiscoveryErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Discovery(kind),
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

/// Helper function to create ID token errors.
pub fn id_token_error(kind: IdTokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::IdToken(kind),
    }
}
