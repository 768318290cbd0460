use crate::controller::{
    health_check_controller, home_controller, oauth_controller, user_session_controller,
};
use crate::AppState;
use axum::{routing::get, Router};

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/google-login";
/// Registered with the provider as `<external url>/signin-google`.
pub const CALLBACK_PATH: &str = "/signin-google";
pub const LOGOUT_PATH: &str = "/logout";

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(home_routes(app_state.clone()))
        .merge(oauth_routes(app_state.clone()))
        .merge(user_session_routes(app_state))
        .merge(health_routes())
}

fn home_routes(app_state: AppState) -> Router {
    Router::new()
        .route(HOME_PATH, get(home_controller::index))
        .with_state(app_state)
}

/// Routes for the Google sign-in flow
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route(LOGIN_PATH, get(oauth_controller::login))
        .route(CALLBACK_PATH, get(oauth_controller::callback))
        .with_state(app_state)
}

pub fn user_session_routes(app_state: AppState) -> Router {
    Router::new()
        .route(LOGOUT_PATH, get(user_session_controller::logout))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}
