use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use reviewpilot_api::config::{self, AppConfig};
use reviewpilot_api::database::manager;
use reviewpilot_api::handlers::{method_not_allowed, protected, public};
use reviewpilot_api::middleware::route_guard;
use reviewpilot_api::responder::TemplateResponder;
use reviewpilot_api::services::fixtures;
use reviewpilot_api::state::AppState;

#[derive(Parser)]
#[command(name = "reviewpilot-api", about = "Review aggregation SaaS backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Start the HTTP API server")]
    Serve {
        #[arg(long, help = "Port override (falls back to PORT env, then config)")]
        port: Option<u16>,
    },

    #[command(about = "Populate the database with fixture data")]
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = config::config();

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(config, port).await,
        Command::Seed => seed(config).await,
    }
}

async fn serve(config: &AppConfig, port_override: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("Starting ReviewPilot API in {:?} mode", config.environment);

    let pool = manager::connect(config).await?;
    let responder = Arc::new(TemplateResponder::new(config.responder.simulate_latency_ms));
    let state = AppState::new(pool, responder);

    let app = app(state);

    let port = port_override.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("ReviewPilot API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn seed(config: &AppConfig) -> anyhow::Result<()> {
    if config.is_production() {
        anyhow::bail!("Seeding is not allowed in production");
    }

    let pool = manager::connect(config).await?;
    let summary = fixtures::seed_database(&pool).await?;
    println!(
        "Seeded {} users and {} reviews",
        summary.users_created, summary.reviews_created
    );
    println!("Test credentials:");
    println!("  {} / {}", fixtures::TEST_USER_EMAIL, fixtures::TEST_USER_PASSWORD);
    println!("  {} / {}", fixtures::TEST_ADMIN_EMAIL, fixtures::TEST_ADMIN_PASSWORD);
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(seed_routes())
        // Protected (enforced by the route guard)
        .merge(review_routes())
        .merge(ai_routes())
        .merge(dashboard_routes())
        .fallback(not_found)
        // Global middleware
        .layer(axum::middleware::from_fn(route_guard))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route(
            "/api/auth/signup",
            post(auth::signup)
                .get(method_not_allowed)
                .put(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route(
            "/api/auth/login",
            post(auth::login)
                .get(method_not_allowed)
                .put(method_not_allowed)
                .delete(method_not_allowed),
        )
        // Some clients prefer GET for logout
        .route(
            "/api/auth/logout",
            post(auth::logout)
                .get(auth::logout)
                .put(method_not_allowed)
                .delete(method_not_allowed),
        )
}

fn seed_routes() -> Router<AppState> {
    Router::new().route(
        "/api/seed",
        post(public::seed::seed)
            .get(method_not_allowed)
            .put(method_not_allowed)
            .delete(method_not_allowed),
    )
}

fn review_routes() -> Router<AppState> {
    use protected::reviews;

    Router::new()
        .route(
            "/api/reviews",
            get(reviews::list)
                .post(reviews::create)
                .put(method_not_allowed)
                .patch(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route(
            "/api/reviews/:id",
            get(reviews::get_one)
                .put(reviews::update)
                .delete(reviews::delete_one)
                .post(method_not_allowed)
                .patch(method_not_allowed),
        )
}

fn ai_routes() -> Router<AppState> {
    Router::new().route(
        "/api/ai/respond",
        post(protected::respond::respond)
            .get(method_not_allowed)
            .put(method_not_allowed)
            .delete(method_not_allowed),
    )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/dashboard/stats",
            get(protected::dashboard::stats)
                .post(method_not_allowed)
                .put(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route(
            "/api/subscription",
            get(protected::subscription::current)
                .post(method_not_allowed)
                .put(method_not_allowed)
                .delete(method_not_allowed),
        )
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "ReviewPilot API",
            "version": version,
            "description": "Review aggregation, response drafting, and dashboard analytics",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "auth": "/api/auth/signup, /api/auth/login, /api/auth/logout (public)",
                "reviews": "/api/reviews[/:id] (protected)",
                "ai": "/api/ai/respond (protected)",
                "dashboard": "/api/dashboard/stats (protected)",
                "subscription": "/api/subscription (protected)",
                "seed": "/api/seed (non-production only)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match manager::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found() -> reviewpilot_api::error::ApiError {
    reviewpilot_api::error::ApiError::not_found("Route not found")
}
