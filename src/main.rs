use quillpress::{
    AppState,
    auth::TokenService,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, Repository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for initializing
/// all core components: configuration, logging, database, token service, and the
/// HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (fail-fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    // Sets the default log level. It prioritizes the RUST_LOG environment variable,
    // falling back to sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quillpress=debug,tower_http=info,axum=trace".into());

    // 3. Initialize Logging based on Environment
    // The structured logging format is dynamically selected based on APP_ENV.
    match config.env {
        Env::Local => {
            // LOCAL: pretty-printed output for human readability during debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database Initialization (Postgres)
    // Creates a connection pool to the Postgres instance defined in the
    // configuration, then provisions the schema if it does not exist yet.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    PostgresRepository::ensure_schema(&pool)
        .await
        .expect("FATAL: Failed to provision database schema.");

    // Instantiate the repository, wrapping it in an Arc for thread-safe sharing.
    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Admin Seeding (out-of-band provisioning)
    // There is no public registration endpoint; the administrator account is
    // created here when the seed pair is present in the environment.
    if let (Ok(username), Ok(password)) = (
        std::env::var("ADMIN_USERNAME"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        seed_admin(repo.as_ref(), &username, &password).await;
    }

    // 6. Token Service
    // Constructed once from the configured secret; the secret is never looked up
    // ambiently after this point.
    let tokens = TokenService::from_config(&config);

    // 7. Unified State Assembly and Server Startup
    let port = config.port;
    let app_state = AppState {
        repo,
        tokens,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: Failed to bind HTTP listener.");

    tracing::info!("Listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await.unwrap();
}

/// seed_admin
///
/// Creates the administrator account if the username is not already present.
/// Seeding failures are logged and do not abort startup: the public surface works
/// without an admin account, only the dashboard is unusable.
async fn seed_admin(repo: &dyn Repository, username: &str, password: &str) {
    match repo.get_admin_by_username(username).await {
        Ok(Some(_)) => {
            tracing::debug!("admin '{}' already provisioned", username);
        }
        Ok(None) => {
            let hash = match bcrypt::hash(password, bcrypt::DEFAULT_COST) {
                Ok(hash) => hash,
                Err(error) => {
                    tracing::error!("failed to hash admin password: {:?}", error);
                    return;
                }
            };
            match repo.create_admin(username, &hash).await {
                Ok(admin) => tracing::info!("seeded admin '{}'", admin.username),
                Err(error) => tracing::error!("failed to seed admin: {:?}", error),
            }
        }
        Err(error) => tracing::error!("admin lookup failed during seeding: {:?}", error),
    }
}
