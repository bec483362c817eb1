use std::net::TcpListener;
use std::sync::Arc;

use jobboard::configuration::get_configuration;
use jobboard::session::RedisSessionStore;
use jobboard::startup::run;
use jobboard::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    let connection_string = configuration.database.connection_string();
    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    tracing::info!("Database connection pool created successfully");

    let session_store = RedisSessionStore::connect(&configuration.redis.uri)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to session store: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Session store connection error",
            )
        })?;

    tracing::info!("Session store connected successfully");

    let address = format!("127.0.0.1:{}", configuration.application.port);
    tracing::info!("Binding server to address: {}", address);

    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        pool,
        configuration.jwt.clone(),
        Arc::new(session_store),
    )?;
    tracing::info!("Server started successfully");

    let _ = server.await;

    Ok(())
}
