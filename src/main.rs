use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use academy_api::build_app;
use academy_api::shared::clients::mailer_from_settings;
use academy_api::shared::config::AppConfig;
use academy_api::shared::database::{AuthStore, Database, MemoryAuthStore, PgAuthStore};
use academy_api::shared::services::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 로깅 초기화 (RUST_LOG 우선)
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("academy_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    if config.uses_default_jwt_secret() {
        tracing::warn!("JWT_SECRET is not set, using the development default");
    }

    // 저장소: DATABASE_URL 있으면 PostgreSQL, 없으면 인메모리
    let store: Arc<dyn AuthStore> = match &config.database_url {
        Some(db_url) => {
            let db = Database::new(db_url, config.db_max_connections)
                .await
                .context("Failed to connect to database")?;
            db.initialize()
                .await
                .context("Failed to initialize database")?;
            Arc::new(PgAuthStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, accounts are kept in memory only");
            Arc::new(MemoryAuthStore::new())
        }
    };

    let mailer = mailer_from_settings(&config.mail).context("Failed to build mailer")?;

    // AppState 생성 (모든 Service 초기화)
    let app_state = AppState::new(store, mailer, config.auth.clone())
        .context("Failed to initialize AppState")?;

    if let Some(admin) = &config.bootstrap_admin {
        app_state
            .auth_state
            .auth_service
            .ensure_admin(&admin.email, &admin.password)
            .await
            .context("Failed to create bootstrap admin")?;
    }

    // 만료 세션/링크 정리 스케줄러 시작
    let sweeper = app_state.auth_state.expiry_sweeper(config.sweep_interval);
    let _sweeper_handle = sweeper.start();

    // CORS 설정
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .context("Invalid CORS_ORIGIN")?,
        )
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = build_app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, "server listening");
    tracing::info!("Swagger UI available at http://{}/api", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
