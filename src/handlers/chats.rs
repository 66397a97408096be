// Session CRUD and search handlers under /api/chats

use tracing::info;
use warp::Rejection;

use crate::error::ApiError;
use crate::models::{
    ChatIdResponse, CreateChatRequest, RenameChatRequest, RenameResponse, SearchQuery,
    SearchResponse, SessionsResponse, StatusResponse,
};
use crate::state::AppState;
use crate::store::NewSession;

fn reject(err: impl Into<ApiError>) -> Rejection {
    warp::reject::custom(err.into())
}

fn status(message: &str) -> warp::reply::Json {
    warp::reply::json(&StatusResponse {
        message: message.to_string(),
    })
}

/// GET /api/chats
pub async fn list_chats_handler(state: AppState) -> Result<impl warp::Reply, Rejection> {
    let sessions = state.store.list();
    Ok(warp::reply::json(&SessionsResponse { sessions }))
}

/// GET /api/chats/{id}
pub async fn get_chat_handler(id: String, state: AppState) -> Result<impl warp::Reply, Rejection> {
    let session = state.store.get(&id).map_err(reject)?;
    Ok(warp::reply::json(&session))
}

/// POST /api/chats
pub async fn create_chat_handler(
    request: CreateChatRequest,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let chat_id = state.store.create(NewSession {
        id: request.chat_id.filter(|id| !id.is_empty()),
        title: request.title,
        first_message: request.message,
    });
    Ok(warp::reply::json(&ChatIdResponse { chat_id }))
}

/// PATCH /api/chats/{id}
pub async fn rename_chat_handler(
    id: String,
    request: RenameChatRequest,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let title = request.title.unwrap_or_default();
    state.store.rename(&id, &title).map_err(reject)?;

    info!(chat_id = %id, %title, "renamed chat session");
    Ok(warp::reply::json(&RenameResponse {
        message: "Title updated successfully".to_string(),
        title,
    }))
}

/// DELETE /api/chats/{id}
pub async fn delete_chat_handler(
    id: String,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    state.store.delete(&id).map_err(reject)?;

    info!(chat_id = %id, "deleted chat session");
    Ok(status("Chat deleted successfully"))
}

/// DELETE /api/chats
pub async fn clear_chats_handler(state: AppState) -> Result<impl warp::Reply, Rejection> {
    state.store.clear_all();

    info!("deleted all chat sessions");
    Ok(status("All chats deleted successfully"))
}

/// DELETE /api/chats/{id}/message/{msg_id}
pub async fn delete_message_handler(
    id: String,
    message_id: String,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    state
        .store
        .delete_message(&id, &message_id)
        .map_err(|_| reject(ApiError::NotFound("Chat or message not found".to_string())))?;
    Ok(status("Message deleted successfully"))
}

/// GET /api/chats/search?q=
pub async fn search_chats_handler(
    query: SearchQuery,
    state: AppState,
) -> Result<impl warp::Reply, Rejection> {
    let results = state.store.search(&query.q);
    Ok(warp::reply::json(&SearchResponse { results }))
}
