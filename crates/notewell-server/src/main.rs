use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use notewell_api::mailer::Mailer;
use notewell_api::token::TokenService;
use notewell_api::{AppStateInner, router};
use notewell_cache::NoteCache;
use notewell_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notewell=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("NOTEWELL_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("NOTEWELL_DB_PATH").unwrap_or_else(|_| "notewell.db".into());
    let host = std::env::var("NOTEWELL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("NOTEWELL_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = Database::open(&PathBuf::from(&db_path))?;

    // Note cache: remote when a Redis URL is configured
    let cache = match std::env::var("NOTEWELL_REDIS_URL") {
        Ok(url) => {
            info!("Connecting note cache to {}", url);
            NoteCache::connect(&url).await?
        }
        Err(_) => {
            info!("NOTEWELL_REDIS_URL not set, using in-process note cache");
            NoteCache::new_local()
        }
    };

    // Outbound email
    let mailer = match std::env::var("NOTEWELL_SMTP_HOST") {
        Ok(smtp_host) => {
            let smtp_port: u16 = std::env::var("NOTEWELL_SMTP_PORT")
                .unwrap_or_else(|_| "465".into())
                .parse()?;
            let username = std::env::var("NOTEWELL_SMTP_USERNAME")?;
            let password = std::env::var("NOTEWELL_SMTP_PASSWORD")?;
            let from = std::env::var("NOTEWELL_SMTP_FROM").unwrap_or_else(|_| username.clone());
            Mailer::smtp(&smtp_host, smtp_port, username, password, from)?
        }
        Err(_) => {
            info!("NOTEWELL_SMTP_HOST not set, logging outbound email instead");
            Mailer::log_only()
        }
    };

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        cache,
        tokens: TokenService::new(jwt_secret),
        mailer,
    });

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(15)));

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Notewell server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
