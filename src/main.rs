use chorus::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    store::{MemoryStore, PostgresStore, StoreState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: Configuration, Logging, the Post Store,
/// and the HTTP Server.
#[tokio::main]
async fn main() {
    // 1. Configuration (Fail-Fast)
    // .env values must be in place before the config reads the environment.
    dotenv::dotenv().ok();
    // Missing production secrets abort here, before anything is bound.
    let config = AppConfig::load();

    // 2. Logging Filter
    // RUST_LOG wins when set; otherwise these per-crate defaults apply.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "chorus=debug,tower_http=info,axum=trace".into());

    // 3. Subscriber Format per Environment
    match config.env {
        Env::Local => {
            // Human-readable output while developing.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // One JSON object per line for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Starting up in {:?} mode", config.env);

    // 4. Post Store Initialization
    // With a DATABASE_URL we connect a Postgres pool; without one (local only,
    // AppConfig::load guarantees it is present in production) the process runs
    // against the in-memory store.
    let store: StoreState = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");
            Arc::new(PostgresStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; posts live in process memory only");
            Arc::new(MemoryStore::new())
        }
    };

    // 5. Unified State Assembly
    // Both services and the config travel together in one shared AppState.
    let app_state = AppState::new(store, config);

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("Swagger UI: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
