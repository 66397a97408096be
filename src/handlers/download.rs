// GET /download/{filename} handler

use std::io::ErrorKind;
use tracing::error;
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use warp::{Rejection, Reply};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn download_handler(
    filename: String,
    state: AppState,
) -> Result<warp::reply::Response, Rejection> {
    let bytes = match state.uploads.read(&filename).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(warp::reject::custom(ApiError::NotFound(
                "File not found".to_string(),
            )));
        }
        Err(e) => {
            error!(file = %filename, error = %e, "failed to read stored file");
            return Err(warp::reject::custom(ApiError::Internal));
        }
    };

    let content_type = mime_guess::from_path(&filename).first_or_octet_stream();
    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', "_"));

    let reply = warp::reply::with_header(bytes, CONTENT_TYPE, content_type.to_string());
    Ok(warp::reply::with_header(reply, CONTENT_DISPOSITION, disposition).into_response())
}
