use std::convert::Infallible;

use crate::error::Error;
use axum::extract::FromRef;
use axum::response::{IntoResponseParts, ResponseParts};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use domain::error::{DomainErrorKind, Error as DomainError, InternalErrorKind};
use domain::user::UserToken;
use domain::PendingAuthorization;
use log::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};

pub(crate) const SESSION_COOKIE_NAME: &str = "session";

// Browsers drop cookies larger than this.
const MAX_COOKIE_VALUE_LEN: usize = 4096;

/// How session cookies are signed and issued. Built once from the config.
#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    secure: bool,
    lifetime_seconds: i64,
}

impl SessionSettings {
    pub fn new(secret: &str, secure: bool, lifetime_seconds: u64) -> Self {
        Self {
            key: session_key(secret),
            secure,
            lifetime_seconds: i64::try_from(lifetime_seconds).unwrap_or(i64::MAX),
        }
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .http_only(true)
            .secure(self.secure)
            // Lax so the cookie survives the top-level redirect back from the provider.
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(Duration::seconds(self.lifetime_seconds))
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, "")).path("/").build()
    }
}

// Cookie signing needs 64 bytes of key material; any secret length is accepted.
fn session_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

/// Everything the session holds. Serialized as JSON into the signed cookie.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionData {
    /// Unix time after which the cookie is no longer honoured.
    #[serde(rename = "exp", default)]
    expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserToken>,
    #[serde(
        rename = "_oauth_pending",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pending_authorization: Option<PendingAuthorization>,
}

impl SessionData {
    fn is_empty(&self) -> bool {
        self.user.is_none() && self.pending_authorization.is_none()
    }

    fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|err| warn!("Session cookie is not valid base64: {err}"))
            .ok()?;
        let data: SessionData = serde_json::from_slice(&bytes)
            .map_err(|err| warn!("Session cookie holds unreadable data: {err}"))
            .ok()?;

        if data.expires_at <= OffsetDateTime::now_utc().unix_timestamp() {
            debug!("Session cookie has expired");
            return None;
        }
        Some(data)
    }

    fn encode(&self) -> Result<String, Error> {
        let json = serde_json::to_vec(self).map_err(|err| {
            Error::from(DomainError {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Session),
            })
        })?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }
}

/// Typed view of the signed session cookie. Holds the signed-in user and, between the
/// login redirect and the callback, the pending authorization.
///
/// Nothing is kept on the server: a handler that changes the session must return it as
/// part of its response so the updated cookie is sent back to the browser.
pub(crate) struct UserSession {
    jar: SignedCookieJar,
    settings: SessionSettings,
    data: SessionData,
    modified: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for UserSession
where
    S: Send + Sync,
    SessionSettings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let settings = SessionSettings::from_ref(state);
        let jar = SignedCookieJar::from_headers(&parts.headers, settings.key.clone());

        // A missing, tampered or expired cookie is an anonymous session.
        let data = jar
            .get(SESSION_COOKIE_NAME)
            .and_then(|cookie| SessionData::decode(cookie.value()))
            .unwrap_or_default();

        Ok(UserSession {
            jar,
            settings,
            data,
            modified: false,
        })
    }
}

impl UserSession {
    pub fn user(&self) -> Option<&UserToken> {
        self.data.user.as_ref()
    }

    /// Starts a fresh session holding only the user; nothing from the anonymous session
    /// carries over.
    pub fn set_user(&mut self, user: UserToken) {
        self.data = SessionData {
            user: Some(user),
            ..SessionData::default()
        };
        self.modified = true;
    }

    pub fn remove_user(&mut self) {
        if self.data.user.take().is_some() {
            self.modified = true;
        }
    }

    pub fn set_pending_authorization(&mut self, pending: PendingAuthorization) {
        self.data.pending_authorization = Some(pending);
        self.modified = true;
    }

    /// The pending authorization is gone from the returned cookie after this call,
    /// whatever it returns.
    pub fn take_pending_authorization(&mut self) -> Option<PendingAuthorization> {
        let pending = self.data.pending_authorization.take();
        if pending.is_some() {
            self.modified = true;
        }
        pending
    }
}

impl IntoResponseParts for UserSession {
    type Error = Error;

    fn into_response_parts(mut self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if !self.modified {
            return Ok(res);
        }

        let jar = if self.data.is_empty() {
            self.jar.remove(self.settings.removal_cookie())
        } else {
            self.data.expires_at = OffsetDateTime::now_utc()
                .unix_timestamp()
                .saturating_add(self.settings.lifetime_seconds);
            let value = self.data.encode()?;
            if value.len() > MAX_COOKIE_VALUE_LEN {
                warn!(
                    "Session cookie is {} bytes, browsers may refuse it",
                    value.len()
                );
            }
            self.jar.add(self.settings.cookie(value))
        };

        jar.into_response_parts(res).map_err(|never| match never {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use domain::TokenSet;
    use serde_json::json;
    use tower::ServiceExt;

    const SECRET: &str = "test-session-secret";

    fn test_user() -> UserToken {
        UserToken::new(
            TokenSet {
                access_token: "ya29.token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: Some(3599),
                expires_at: None,
                refresh_token: None,
                scope: None,
                id_token: None,
                userinfo: None,
            },
            json!({"genders": [{"value": "female"}]}),
        )
    }

    fn test_pending() -> PendingAuthorization {
        PendingAuthorization {
            state: "state-abc".to_string(),
            pkce_verifier: "verifier-xyz".to_string(),
            nonce: Some("nonce-123".to_string()),
        }
    }

    async fn sign_in(mut session: UserSession) -> impl IntoResponse {
        session.set_user(test_user());
        (session, "signed in")
    }

    async fn whoami(session: UserSession) -> String {
        match session.user() {
            Some(user) => user.token.access_token.clone(),
            None => "anonymous".to_string(),
        }
    }

    async fn sign_out(mut session: UserSession) -> impl IntoResponse {
        session.remove_user();
        (session, "signed out")
    }

    async fn start(mut session: UserSession) -> impl IntoResponse {
        session.set_pending_authorization(test_pending());
        (session, "started")
    }

    async fn take(mut session: UserSession) -> impl IntoResponse {
        let body = match session.take_pending_authorization() {
            Some(pending) => pending.state,
            None => "none".to_string(),
        };
        (session, body)
    }

    fn test_app_with(settings: SessionSettings) -> Router {
        Router::new()
            .route("/sign-in", get(sign_in))
            .route("/whoami", get(whoami))
            .route("/sign-out", get(sign_out))
            .route("/start", get(start))
            .route("/take", get(take))
            .with_state(settings)
    }

    fn test_app() -> Router {
        test_app_with(SessionSettings::new(SECRET, false, 3600))
    }

    async fn call(app: &Router, uri: &str, cookie: Option<&str>) -> (Option<String>, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .map(|value| value.to_str().unwrap().split(';').next().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (set_cookie, String::from_utf8(bytes.to_vec()).unwrap())
    }

    // Signs `data` the same way the extractor expects, bypassing the expiry stamp.
    fn signed_cookie(data: &SessionData) -> String {
        let jar = SignedCookieJar::<Key>::new(session_key(SECRET))
            .add(Cookie::new(SESSION_COOKIE_NAME, data.encode().unwrap()));
        let response = (jar, "").into_response();
        response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_session_key_is_stable_for_same_secret() {
        assert_eq!(
            session_key("change-me").master(),
            session_key("change-me").master()
        );
        assert_ne!(
            session_key("change-me").master(),
            session_key("something else").master()
        );
    }

    #[test]
    fn test_session_key_accepts_short_secret() {
        assert_eq!(session_key("x").master().len(), 64);
    }

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = SessionSettings::new(SECRET, true, 86400).cookie("value".to_string());

        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(86400)));
    }

    #[tokio::test]
    async fn test_user_round_trips_through_session() {
        let app = test_app();

        let (cookie, _) = call(&app, "/sign-in", None).await;
        let cookie = cookie.unwrap();
        let (_, body) = call(&app, "/whoami", Some(&cookie)).await;

        assert_eq!(body, "ya29.token");
    }

    #[tokio::test]
    async fn test_session_survives_a_new_router_with_the_same_secret() {
        let (cookie, _) = call(&test_app(), "/sign-in", None).await;
        let cookie = cookie.unwrap();

        let (_, body) = call(&test_app(), "/whoami", Some(&cookie)).await;

        assert_eq!(body, "ya29.token");
    }

    #[tokio::test]
    async fn test_session_signed_with_another_secret_is_anonymous() {
        let (cookie, _) = call(&test_app(), "/sign-in", None).await;
        let cookie = cookie.unwrap();
        let other = test_app_with(SessionSettings::new("another-secret", false, 3600));

        let (_, body) = call(&other, "/whoami", Some(&cookie)).await;

        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_set_user_starts_a_fresh_cookie() {
        let app = test_app();

        let (first, _) = call(&app, "/start", None).await;
        let first = first.unwrap();
        let (second, _) = call(&app, "/sign-in", Some(&first)).await;
        let second = second.unwrap();

        assert_ne!(first, second);
        let (_, body) = call(&app, "/whoami", Some(&second)).await;
        assert_eq!(body, "ya29.token");
        let (_, body) = call(&app, "/take", Some(&second)).await;
        assert_eq!(body, "none");
    }

    #[tokio::test]
    async fn test_remove_user_leaves_session_anonymous() {
        let app = test_app();

        let (cookie, _) = call(&app, "/sign-in", None).await;
        let cookie = cookie.unwrap();
        let (cleared, _) = call(&app, "/sign-out", Some(&cookie)).await;
        let cleared = cleared.unwrap();
        let (_, body) = call(&app, "/whoami", Some(&cleared)).await;

        assert_eq!(cleared, "session=");
        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_pending_authorization_is_single_use() {
        let app = test_app();

        let (cookie, _) = call(&app, "/start", None).await;
        let cookie = cookie.unwrap();
        let (after_take, first) = call(&app, "/take", Some(&cookie)).await;
        let after_take = after_take.unwrap();
        let (_, second) = call(&app, "/take", Some(&after_take)).await;

        assert_eq!(first, "state-abc");
        assert_eq!(second, "none");
    }

    #[tokio::test]
    async fn test_expired_session_is_anonymous() {
        let cookie = signed_cookie(&SessionData {
            expires_at: OffsetDateTime::now_utc().unix_timestamp() - 10,
            user: Some(test_user()),
            pending_authorization: None,
        });

        let (_, body) = call(&test_app(), "/whoami", Some(&cookie)).await;

        assert_eq!(body, "anonymous");
    }

    #[tokio::test]
    async fn test_unexpired_session_is_honoured() {
        let cookie = signed_cookie(&SessionData {
            expires_at: OffsetDateTime::now_utc().unix_timestamp() + 60,
            user: Some(test_user()),
            pending_authorization: None,
        });

        let (_, body) = call(&test_app(), "/whoami", Some(&cookie)).await;

        assert_eq!(body, "ya29.token");
    }

    #[tokio::test]
    async fn test_missing_session_cookie_is_anonymous() {
        let app = test_app();

        let (cookie, body) = call(&app, "/whoami", None).await;

        assert!(cookie.is_none());
        assert_eq!(body, "anonymous");
    }
}
