//! OAuth 2.0 / OpenID Connect sign-in against a discovered provider.
//!
//! Provides authorization code flows with PKCE (S256), CSRF state and nonce handling,
//! code exchange and ID token verification.

mod client;
mod discovery;
mod id_token;
mod token;

pub use client::{AuthorizationRequest, CallbackParams, Client, PendingAuthorization, Registration};
pub use discovery::ProviderMetadata;
pub use id_token::IdTokenClaims;
pub use token::TokenSet;
