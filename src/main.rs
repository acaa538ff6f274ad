use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use chat_gateway::firestore_client::FirestoreClient;
use chat_gateway::rag_client::RagClient;
use chat_gateway::services::chat::ChatService;
use chat_gateway::{handlers, middleware, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize production-grade logging
    init_logging().expect("Failed to initialize logging");

    // The store handle is mandatory. Missing credentials stop the process
    // here, before the listener ever binds.
    let firestore = FirestoreClient::initialize()
        .expect("Failed to initialize Firestore - serviceAccountKey.json is required");
    let firestore_project = firestore.project_id().to_string();

    let rag_server_url = std::env::var("RAG_SERVER_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string());
    tracing::info!("🤖 RAG server: {}", rag_server_url);
    let rag_client = RagClient::new(rag_server_url.clone());

    let chat_service = ChatService::new(Arc::new(rag_client), Arc::new(firestore));

    // Create the shared state
    let shared_state = Arc::new(AppState {
        chat_service,
        rag_server_url,
        firestore_project,
    });

    // Build our application with all routes and shared state
    let app = Router::new()
        .merge(handlers::chat::chatbot_routes())
        .route("/api/status", axum::routing::get(api_status))
        .layer(axum::middleware::from_fn(
            middleware::logging::request_logging_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(Extension(shared_state));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("Failed to bind 0.0.0.0:8080");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("server error");
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    // Get log level from environment or default to INFO for production
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,chat_gateway=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,chat_gateway=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    // JSON logging for production log aggregation, human-readable otherwise
    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("💬 Chat gateway starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Build mode: {}",
        if cfg!(debug_assertions) { "development" } else { "production" }
    );
    tracing::info!("Log level: {}", log_level);

    Ok(())
}

// API Status endpoint
async fn api_status(
    Extension(state): Extension<chat_gateway::SharedState>,
) -> axum::response::Json<serde_json::Value> {
    use serde_json::json;

    axum::response::Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "rag_server": state.rag_server_url,
            "firestore_project": state.firestore_project,
        },
        "endpoints": {
            "status": "/api/status",
            "ask": "/api/chatbot/ask",
            "room_delete": "/api/chatbot/room/delete",
            "history": "/api/chatbot/history"
        }
    }))
}
