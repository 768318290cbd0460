use log::*;
use service::{config::Config, logging::Logger};
use web::AppState;

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config);

    info!(
        "Starting profile_login in {} mode, external URL {}",
        config.runtime_env(),
        config.external_url()
    );

    let app_state = match AppState::init(config).await {
        Ok(app_state) => app_state,
        Err(e) => {
            error!("Failed to initialize OAuth client: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = web::init_server(app_state).await {
        error!("Server stopped: {e}");
        std::process::exit(1);
    }
}
