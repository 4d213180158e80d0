use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::{routing::get, Router};
use clap::Parser;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use talent_gateway::config::{self, AppConfig};
use talent_gateway::handlers::{pages, session};
use talent_gateway::middleware::{current_user_middleware, token_sync_middleware};
use talent_gateway::state::AppState;

#[derive(Parser)]
#[command(name = "talent-gateway")]
#[command(about = "Session bootstrap gateway for the digital-talent platform")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides TALENT_GATEWAY_PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up endpoint and session-dir overrides
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("talent_gateway=info,tower_http=info")
            }),
        )
        .init();

    tracing::info!("Starting Talent Gateway in {:?} mode", config.environment);

    let state = AppState::from_config(config)
        .unwrap_or_else(|e| panic!("failed to initialize application state: {}", e));

    // The logout channel lives as long as the application root. Each context
    // attaches a listener that drops the memoized user when any context
    // broadcasts the sentinel; the broadcaster already cleared the store.
    state.logout_channel.open();
    let _logout_subscription = {
        let cache = state.user_cache.clone();
        state.logout_channel.subscribe(move || cache.clear())
    };

    let app = app(state);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Talent Gateway listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    // Navigation pipeline: token sync is outermost and runs first; user
    // resolution runs next; handlers interpret the route-guard outcome.
    let session_pipeline = Router::new()
        .merge(page_routes())
        .merge(session_routes())
        .layer(from_fn_with_state(state.clone(), current_user_middleware))
        .layer(from_fn_with_state(state.clone(), token_sync_middleware));

    Router::new()
        // Public service endpoints outside the pipeline
        .route("/", get(pages::root))
        .route("/health", get(pages::health))
        .merge(session_pipeline)
        // Global middleware
        .layer(cors_layer(config::config()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn page_routes() -> Router<AppState> {
    Router::new()
        // Public pages
        .route("/:locale", get(pages::locale_home))
        .route("/:locale/login-info", get(pages::login_info))
        .route("/:locale/logged-out", get(pages::logged_out))
        // Guarded pages
        .route("/:locale/applicant", get(pages::applicant_home))
        .route("/:locale/applicant/profile", get(pages::applicant_profile))
        .route("/:locale/admin/users", get(pages::admin_users))
}

fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/whoami", get(session::whoami))
        .route("/auth/logout", get(session::logout))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if !config.security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
