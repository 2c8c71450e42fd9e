//! Chat API handlers
//!
//! Upsert-and-append, single chat lookup, and per-company summaries.

use crate::error::AppError;
use crate::models::{Chat, ChatListItem, NewChat};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

/// Query for `GET /chats`
#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    /// Owning company key
    #[serde(rename = "companyId")]
    pub company_id: String,
    /// Contact phone number
    #[serde(rename = "contactPhone")]
    pub contact_phone: String,
}

/// Query for `GET /chats/list`
#[derive(Debug, Deserialize)]
pub struct ChatListQuery {
    /// Owning company key
    #[serde(rename = "companyId")]
    pub company_id: String,
}

/// POST /chats - Append messages to a chat, creating it if needed
///
/// Returns the stored chat with its complete message history.
pub async fn upsert_chat(
    State(state): State<AppState>,
    payload: Result<Json<NewChat>, JsonRejection>,
) -> Result<Json<Chat>, AppError> {
    let Json(chat) = payload?;
    chat.validate().map_err(AppError::Validation)?;

    let appended = chat.messages.len();
    let stored = state.store.upsert_chat(chat, Utc::now()).await?;

    info!(
        company_id = %stored.company_id,
        chat_id = %stored.chat_id,
        appended,
        total = stored.messages.len(),
        "Chat upserted"
    );

    Ok(Json(stored))
}

/// GET /chats?companyId=&contactPhone= - Fetch one chat
pub async fn get_chat(
    State(state): State<AppState>,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> Result<Json<Chat>, AppError> {
    let Query(query) = query?;

    state
        .store
        .find_chat(&query.company_id, &query.contact_phone)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Chat not found.".to_string()))
}

/// GET /chats/list?companyId= - List chat summaries for a company
pub async fn list_chats(
    State(state): State<AppState>,
    query: Result<Query<ChatListQuery>, QueryRejection>,
) -> Result<Json<Vec<ChatListItem>>, AppError> {
    let Query(query) = query?;
    let chats = state
        .store
        .list_chats(&query.company_id, state.query_limit)
        .await?;
    Ok(Json(chats))
}
