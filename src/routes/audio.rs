use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use tower::util::ServiceExt;
use tower_http::services::ServeFile;

use crate::{error::AppError, state::SharedState};

pub async fn audio_handler(
    State(state): State<SharedState>,
    Path(filename): Path<String>,
    request: Request,
) -> Result<Response, AppError> {
    let Some(path) = state.audio().resolve(&filename) else {
        tracing::warn!(filename = %filename, "rejected audio filename");
        return Err(AppError::NotFound);
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(AppError::NotFound),
    }

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    // Raced with a sweep, or unreadable.
    if response.status() == StatusCode::NOT_FOUND {
        return Err(AppError::NotFound);
    }

    let mut response = response.map(Body::new);
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    Ok(response)
}
