use job_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Boots the service: configuration, logging, database pool and migrations,
/// then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration (Fail-Fast)
    // .env is read first so AppConfig sees file-provided variables too.
    dotenv::dotenv().ok();
    // Missing production secrets abort here, before anything binds or connects.
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // RUST_LOG wins when set; otherwise a chatty-enough local default.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "job_portal=debug,tower_http=info,axum=trace".into());

    // 3. Logging Output per Environment
    match config.env {
        Env::Local => {
            // Human-readable while developing.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database (Postgres)
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    // Schema migrations run before the listener opens.
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("FATAL: Failed to run database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Shared State
    let app_state = AppState { repo, config };

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:8000")
        .await
        .expect("FATAL: Failed to bind 0.0.0.0:8000");

    tracing::info!("Listening on 0.0.0.0:8000");
    tracing::info!("Swagger UI available at: http://localhost:8000/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: Server error");
}
