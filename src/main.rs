use log::*;
use relay::Manager;
use service::{config::Config, logging::Logger, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to initialize logger: {e}");
        std::process::exit(1);
    }

    info!("Starting up fanout relay...");

    let (manager, broadcasters) = Manager::new();
    let relay_manager = Arc::new(manager);
    broadcasters.spawn();

    if config.disable_poller {
        info!("Storage poller disabled, only POST /req records will be relayed");
    } else {
        let db = match service::init_database(&config).await {
            Ok(db) => Arc::new(db),
            Err(e) => {
                error!("Failed to establish database connection: {e}");
                std::process::exit(1);
            }
        };

        let poller = domain::user::Poller::new(
            db,
            relay_manager.user_ingress().clone(),
            config.poll_interval(),
        );
        tokio::spawn(poller.run());
    }

    let app_state = AppState::new(config, &relay_manager);

    if let Err(e) = web::init_server(app_state).await {
        error!("Server failed: {e}");
        std::process::exit(1);
    }
}
