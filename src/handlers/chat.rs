// POST /api/chat handler

use bytes::Buf;
use futures_util::TryStreamExt;
use std::convert::Infallible;
use tracing::{error, warn};
use warp::multipart::{FormData, Part};
use warp::Reply;

use crate::error::ApiError;
use crate::models::{ChatReplyResponse, SendMessageRequest};
use crate::service::{SendMessage, Upload};
use crate::state::AppState;

/// JSON body: text and chat id only
pub async fn send_json_handler(
    request: SendMessageRequest,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    let input = SendMessage {
        text: request.message.unwrap_or_default(),
        chat_id: request.chat_id,
        file: None,
    };
    Ok(respond(&state, input).await)
}

/// multipart/form-data body: `message`, `chat_id` and an optional `file`
pub async fn send_form_handler(
    form: FormData,
    state: AppState,
) -> Result<warp::reply::Response, Infallible> {
    match read_form(form).await {
        Ok(input) => Ok(respond(&state, input).await),
        Err(e) => {
            warn!(error = %e, "malformed multipart form");
            Ok(ApiError::InvalidInput(format!("Invalid multipart form: {}", e)).into_reply())
        }
    }
}

async fn respond(state: &AppState, input: SendMessage) -> warp::reply::Response {
    match state.chat.send(input).await {
        Ok(reply) => warp::reply::json(&ChatReplyResponse {
            reply: reply.reply,
            chat_id: Some(reply.chat_id),
        })
        .into_response(),
        Err(err) => {
            let detail = err.to_string();
            let api_error = ApiError::from(err);
            if api_error == ApiError::Internal {
                error!(error = %detail, "failed to process chat message");
            } else {
                warn!(error = %detail, "rejected chat message");
            }
            api_error.into_chat_reply()
        }
    }
}

async fn read_form(mut form: FormData) -> Result<SendMessage, warp::Error> {
    let mut input = SendMessage::default();

    while let Some(part) = form.try_next().await? {
        let name = part.name().to_string();
        match name.as_str() {
            "message" => input.text = read_text(part).await?,
            "chat_id" => input.chat_id = Some(read_text(part).await?),
            "file" => {
                let filename = part.filename().unwrap_or_default().to_string();
                let bytes = read_bytes(part).await?;
                // Browsers send an empty, unnamed part when no file was picked
                if !filename.is_empty() {
                    input.file = Some(Upload { filename, bytes });
                }
            }
            _ => {}
        }
    }

    Ok(input)
}

async fn read_text(part: Part) -> Result<String, warp::Error> {
    let bytes = read_bytes(part).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn read_bytes(part: Part) -> Result<Vec<u8>, warp::Error> {
    part.stream()
        .try_fold(Vec::new(), |mut acc, mut chunk| async move {
            while chunk.has_remaining() {
                let piece = chunk.chunk();
                let len = piece.len();
                acc.extend_from_slice(piece);
                chunk.advance(len);
            }
            Ok(acc)
        })
        .await
}
