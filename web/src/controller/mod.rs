use axum::http::{header, StatusCode};
use axum::response::IntoResponse;

pub(crate) mod health_check_controller;
pub(crate) mod home_controller;
pub(crate) mod oauth_controller;
pub(crate) mod user_session_controller;


/// 302 Found, the status browsers and OAuth providers expect for these redirects.
fn found(location: &str) -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())])
}
