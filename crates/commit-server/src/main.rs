use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use commit_web::auth::{self, AppState, AppStateInner};
use commit_web::middleware::require_session;
use commit_web::{commitments, notifications, people, posts, subscriptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "commit=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let session_secret =
        std::env::var("COMMIT_SESSION_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("COMMIT_DB_PATH").unwrap_or_else(|_| "commit.db".into());
    let host = std::env::var("COMMIT_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("COMMIT_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = commit_db::Database::open(&PathBuf::from(&db_path))?;

    // Demo accounts and a sample commitment for fresh installs
    let demo_hash = auth::hash_password("password123")?;
    commit_db::seed::ensure_demo_data(&db, &demo_hash)?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner { db, session_secret });

    // Routes
    let public_routes = Router::new()
        .route("/", get(auth::login_page))
        .route("/login", post(auth::login))
        .route("/register", get(auth::register_page))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/commitments", get(commitments::list_page))
        .route("/commitments", post(commitments::create))
        .route("/commitments/{commitment_id}", get(commitments::detail_page))
        .route(
            "/commitments/{commitment_id}/requirements",
            post(commitments::add_requirement),
        )
        .route("/commitments/{commitment_id}/posts", post(posts::create_post))
        .route(
            "/commitments/{commitment_id}/subscription",
            post(subscriptions::toggle),
        )
        .route("/people/{user_id}", get(people::person_page))
        .route("/explore", get(people::explore_page))
        .route("/notifications", get(notifications::list_page))
        .route(
            "/notifications/{notification_id}/read",
            post(notifications::mark_read),
        )
        .layer(middleware::from_fn_with_state(app_state.clone(), require_session))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Commit server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
