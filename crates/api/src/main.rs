use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rollcall_api::config::ServerConfig;
use rollcall_api::router::build_app_router;
use rollcall_api::state::AppState;
use rollcall_events::{EmailConfig, EmailDelivery, EventBus, EventPersistence, NotificationDispatcher};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rollcall_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rollcall_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    rollcall_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    rollcall_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    // Spawn event persistence (writes all events to the database).
    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // Spawn the notification dispatcher. Email delivery is optional; without
    // SMTP configuration, email jobs fail individually and are recorded as
    // such rather than blocking anything.
    let email = EmailConfig::from_env().map(EmailDelivery::new);
    if email.is_none() {
        tracing::warn!("SMTP_HOST not set; email notification jobs will be recorded as failed");
    }
    let webhook_url = std::env::var("NOTIFY_WEBHOOK_URL").ok();
    let dispatcher = NotificationDispatcher::new(pool.clone(), email, webhook_url);
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));

    tracing::info!("Event services started (persistence, notification dispatcher)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Drop the event bus sender to close the broadcast channel.
    // This signals persistence and the dispatcher to shut down after they
    // drain whatever is still buffered.
    drop(event_bus);
    let drain_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let _ = tokio::time::timeout(drain_timeout, persistence_handle).await;
    let _ = tokio::time::timeout(drain_timeout, dispatcher_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
