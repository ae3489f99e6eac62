use fintracker_server::config::Config;
use fintracker_server::constants::DEFAULT_LOG_FILTER;
use fintracker_server::{AppState, create_router, database};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let db = database::init_db(&config.data_path).await?;
    info!(data_path = %config.data_path, "database ready");

    let state = AppState {
        db,
        delete_policy: config.delete_policy,
    };
    let app = create_router(state, config.cors_origin.clone());

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(
        delete_policy = ?config.delete_policy,
        "Server running on http://{}", bind_address
    );

    axum::serve(listener, app).await?;
    Ok(())
}
