use options_desk::config::AppConfig;
use options_desk::server::{self, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("options_desk starting");

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if cfg.fred_api_key.is_none() {
        tracing::warn!("FRED_API_KEY not set, risk-free rate lookups will fail");
    }
    tracing::info!(
        backend = %cfg.pricing_api_base_url,
        payoff_steps = cfg.payoff_steps,
        static_dir = %cfg.static_dir.display(),
        "configuration loaded"
    );

    let port = cfg.server_port;
    let app = server::router(AppState::new(cfg));

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
