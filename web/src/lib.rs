use log::*;
use tokio::net::TcpListener;

pub use service::AppState;

mod controller;
mod error;
pub mod router;
mod ws;

pub use error::{Error, Result};

/// Binds the configured interface and port and serves the relay's routes until
/// the process is stopped.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state.config.interface().to_owned();
    let port = app_state.config.port;
    let server_url = format!("{host}:{port}");

    let listener = TcpListener::bind(&server_url).await?;
    info!("Server starting... listening for connections on http://{server_url}");

    serve(listener, app_state).await
}

/// Serves the relay's routes on an already bound listener.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router::define_routes(app_state)).await
}
