use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use url_summarizer::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let server_addr = config.server_addr;
    if config.hf_token.is_none() {
        tracing::warn!("HF_TOKEN is not set; every submission will be rejected until it is configured");
    }
    tracing::info!(
        model = %config.model.repo_id,
        ssl_verify = config.loader.ssl_verify,
        "starting url-summarizer"
    );

    let app_state = AppState::from_config(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!(addr = %server_addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
