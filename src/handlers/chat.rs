// src/handlers/chat.rs
use crate::models::chat::{ChatRequest, ChatResponse, DeleteRoomRequest, DeleteRoomResponse};
use crate::SharedState;
use axum::{
    extract::{Extension, Query},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

pub fn chatbot_routes() -> Router {
    Router::new()
        .route("/api/chatbot/ask", post(ask))
        .route("/api/chatbot/room/delete", post(delete_room))
        .route("/api/chatbot/history", get(history))
}

/// The client contract is always-200: domain failures travel inside the
/// payload, never as HTTP status codes.
async fn ask(
    Extension(state): Extension<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!(
        "📩 Question received - userId: {}, sessionId: {:?}, source: {:?}",
        request.user_id, request.session_id, request.source
    );

    let response = state.chat_service.process_chat(request).await;

    info!(
        "📤 Returning answer - {} chars, {} source(s)",
        response.answer.len(),
        response.sources.len()
    );
    Json(response)
}

async fn delete_room(
    Extension(state): Extension<SharedState>,
    Json(request): Json<DeleteRoomRequest>,
) -> Json<DeleteRoomResponse> {
    let response = state.chat_service.delete_room(request).await;
    Json(response)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryQuery {
    #[serde(default)]
    user_id: String,
    session_id: Option<String>,
}

async fn history(
    Extension(state): Extension<SharedState>,
    Query(query): Query<HistoryQuery>,
) -> Json<serde_json::Value> {
    match state
        .chat_service
        .chat_history(&query.user_id, query.session_id.as_deref())
        .await
    {
        Ok(room_history) => Json(json!(room_history)),
        Err(e) => {
            error!("❌ History lookup failed: {}", e);
            Json(json!({
                "success": false,
                "message": format!("Failed to load chat history: {}", e),
            }))
        }
    }
}
