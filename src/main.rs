use std::sync::Arc;

use context_summarizer_mcp::{
    build_app, config::Config, logging, webhook::WebhookPusher, AppState,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let config = Config::from_env()?;
    let pusher = WebhookPusher::new(config.webhook_destination(), config.webhook_timeout)?;
    if !pusher.is_configured() {
        warn!("DOC_WEBHOOK_URL or DOC_WEBHOOK_TOKEN missing, summarize_context pushes will fail");
    }

    let bind_socket = config.bind_socket()?;
    let app = build_app(AppState::new(Arc::new(pusher)));
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        base_url_configured = config.public_base_url.is_some(),
        webhook_configured = config.webhook_destination().is_some(),
        webhook_timeout_secs = config.webhook_timeout.as_secs(),
        "server starting"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
