// lib.rs - Main library file that exports all modules
pub mod firestore_client;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rag_client;
pub mod services;
pub mod store;

use std::sync::Arc;

// AppState holds the chat service plus the bits of configuration the
// status endpoint reports. Handlers receive it via an Extension layer.
pub struct AppState {
    pub chat_service: services::chat::ChatService,
    pub rag_server_url: String,
    pub firestore_project: String,
}

pub type SharedState = Arc<AppState>;
