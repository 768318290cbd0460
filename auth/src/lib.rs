//! # auth
//!
//! Everything the application needs from the identity provider:
//! - provider discovery (OpenID configuration document)
//! - authorization URL generation with state, nonce and PKCE challenge
//! - authorization code exchange and ID token verification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use auth::oauth::{Client, Registration};
//!
//! let client = Client::discover(registration, metadata_url).await?;
//! let request = client.authorization_request();
//! // redirect to request.url, keep request.pending for the callback
//! let tokens = client.exchange_code(&params, Some(request.pending)).await?;
//! ```

pub mod error;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
