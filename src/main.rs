use scribble::config::RelayConfig;
use scribble::{routes, state};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env loaded");
    }

    let config = RelayConfig::from_env();
    let port = config.port;
    tracing::info!(
        history_limit = config.history_limit,
        client_channel_capacity = config.client_channel_capacity,
        echo_to_sender = config.echo_to_sender,
        "relay configured"
    );

    let app = routes::app(state::AppState::new(config));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "scribble relay listening");
    axum::serve(listener, app).await
}
