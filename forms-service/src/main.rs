use forms_service::{
    AppState, build_router,
    config::FormsConfig,
    db::Database,
    services::{AuthService, AuthSettings, FormService, GeminiTranslator, Mailer, SessionService, SmtpEmailService},
};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = FormsConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting forms service"
    );

    // Database pool + migrations
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| service_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| service_core::error::AppError::DatabaseError(anyhow::anyhow!(e)))?;
    let db = Database::new(pool);
    tracing::info!("Database initialized successfully");

    // Email: SMTP provider behind the background dispatch queue
    let email = Arc::new(SmtpEmailService::new(&config.smtp)?);
    let mailer = Mailer::spawn(email);
    tracing::info!("Email dispatcher initialized");

    // Translation provider
    let translator = Arc::new(
        GeminiTranslator::new(config.gemini.api_key.clone(), config.gemini.model.clone())
            .map_err(|e| service_core::error::AppError::ConfigError(anyhow::anyhow!(e.to_string())))?,
    );

    // Rate limiters
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let register_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.register_attempts,
        config.rate_limit.register_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );
    tracing::info!("Rate limiters initialized: Login, Register and Global IP");

    // Services
    let sessions = SessionService::new(db.clone(), config.sessions.clone());
    let auth_service = AuthService::new(
        db.clone(),
        sessions,
        mailer.clone(),
        AuthSettings {
            admin_emails: config.security.admin_emails.clone(),
            super_admin_emails: config.security.super_admin_emails.clone(),
            admins_only_login: config.security.admins_only_login,
            frontend_base_url: config.frontend.base_url.clone(),
        },
    );
    let form_service = FormService::new(db.clone(), translator.clone());

    let state = AppState {
        config: config.clone(),
        db,
        auth_service,
        form_service,
        translator,
        mailer,
        login_rate_limiter,
        register_rate_limiter,
        ip_rate_limiter,
    };

    let app = build_router(state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
