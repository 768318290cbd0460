//! Sign-in logic shared by the web layer: the authorization flow around the OAuth client,
//! the People API gateway and the session payload describing a signed-in user.

pub use auth::oauth::{
    AuthorizationRequest, CallbackParams, Client as OAuthClient, PendingAuthorization,
    Registration, TokenSet,
};

pub mod error;
pub mod gateway;
pub mod sign_in;
pub mod user;
