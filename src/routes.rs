// Route definitions

use std::convert::Infallible;
use tracing::info;
use warp::http::Method;
use warp::Filter;

use crate::error::{handle_rejection, ApiError};
use crate::handlers;
use crate::state::AppState;

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// One path segment, percent-decoded
fn segment() -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::path::param::<String>().and_then(|raw: String| async move {
        urlencoding::decode(&raw)
            .map(|decoded| decoded.into_owned())
            .map_err(|_| {
                warp::reject::custom(ApiError::InvalidInput(
                    "Path segment is not valid UTF-8".to_string(),
                ))
            })
    })
}

pub fn configure_routes(
    state: AppState,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let limit = state.max_upload_bytes;
    let api = warp::path("api");
    let chats = api.and(warp::path("chats"));

    // POST /api/chat (multipart/form-data)
    let send_form = api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(limit))
        .and(with_state(state.clone()))
        .and_then(handlers::send_form_handler);

    // POST /api/chat (application/json)
    let send_json = api
        .and(warp::path("chat"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::send_json_handler);

    // GET /api/chats
    let list_chats = chats
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_chats_handler);

    // POST /api/chats
    let create_chat = chats
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::create_chat_handler);

    // DELETE /api/chats
    let clear_chats = chats
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(handlers::clear_chats_handler);

    // GET /api/chats/search?q=
    // Must come before the {id} routes
    let search_chats = chats
        .and(warp::path("search"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query())
        .and(with_state(state.clone()))
        .and_then(handlers::search_chats_handler);

    // GET /api/chats/{id}
    let get_chat = chats
        .and(segment())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::get_chat_handler);

    // PATCH /api/chats/{id}
    let rename_chat = chats
        .and(segment())
        .and(warp::path::end())
        .and(warp::patch())
        .and(warp::body::content_length_limit(limit))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(handlers::rename_chat_handler);

    // DELETE /api/chats/{id}
    let delete_chat = chats
        .and(segment())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(handlers::delete_chat_handler);

    // DELETE /api/chats/{id}/message/{msg_id}
    let delete_message = chats
        .and(segment())
        .and(warp::path("message"))
        .and(segment())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_state(state.clone()))
        .and_then(handlers::delete_message_handler);

    // GET /download/{filename}
    let download = warp::path("download")
        .and(segment())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::download_handler);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(vec!["content-type"]);

    let access_log = warp::log::custom(|req| {
        info!(
            method = %req.method(),
            path = req.path(),
            status = req.status().as_u16(),
            elapsed_ms = req.elapsed().as_millis() as u64,
            "request"
        );
    });

    // Combine routes
    send_form
        .or(send_json)
        .unify()
        .or(list_chats)
        .or(create_chat)
        .or(clear_chats)
        .or(search_chats)
        .or(get_chat)
        .or(rename_chat)
        .or(delete_chat)
        .or(delete_message)
        .or(download)
        .recover(handle_rejection)
        .with(cors)
        .with(access_log)
}
