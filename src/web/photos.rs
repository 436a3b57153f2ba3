use axum::{
    extract::{Path as AxumPath, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use tracing::{debug, error, info};

use crate::gallery;
use crate::ingest::{self, UploadMeta};
use crate::web::{AppState, auth, responses};

/// Accepts one multipart photo upload and runs it through the pipeline.
pub async fn upload_photo(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request,
) -> Response {
    let token = jar
        .get(auth::SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    let (parts, body) = request.into_parts();
    let content_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    // The size bound is a deployment concern; the pipeline itself does not
    // own it, so it is applied here before any body byte is read.
    if let Some(declared) = content_length {
        let limit = state.config().max_body_bytes;
        if declared > limit {
            return responses::too_large(declared, limit);
        }
    }

    let reader = StreamReader::new(body.into_data_stream().map_err(std::io::Error::other));
    let meta = UploadMeta {
        token: token.as_deref(),
        content_length,
        content_type: content_type.as_deref(),
    };

    match ingest::ingest_upload(state.sessions(), meta, reader, state.ingest_config()).await {
        Ok(stored) => {
            debug!(path = %stored.path.display(), "upload stored");
            Redirect::to("/?status=uploaded").into_response()
        }
        Err(err) => responses::ingest_error(&err),
    }
}

/// Serves one stored photo for the gallery grid.
pub async fn serve_photo(
    State(state): State<AppState>,
    jar: CookieJar,
    AxumPath(name): AxumPath<String>,
) -> Response {
    if let Err(redirect) = auth::require_user(&state, &jar).await {
        return redirect.into_response();
    }

    let cfg = state.ingest_config();
    if !gallery::is_photo_name(&name, &cfg.accepted_extension) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = cfg.upload_dir.join(&name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, mime::IMAGE_JPEG.as_ref())],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            StatusCode::NOT_FOUND.into_response()
        }
        Err(err) => {
            error!(?err, file = %path.display(), "failed to read stored photo");
            responses::error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "The photo could not be read.",
            )
        }
    }
}

/// Removes one stored photo.
pub async fn delete_photo(
    State(state): State<AppState>,
    jar: CookieJar,
    AxumPath(name): AxumPath<String>,
) -> Response {
    let username = match auth::require_user(&state, &jar).await {
        Ok(username) => username,
        Err(redirect) => return redirect.into_response(),
    };

    let cfg = state.ingest_config();
    if !gallery::is_photo_name(&name, &cfg.accepted_extension) {
        return StatusCode::NOT_FOUND.into_response();
    }

    let path = cfg.upload_dir.join(&name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            info!(user = %username, file = %name, "photo deleted");
            Redirect::to("/?status=deleted").into_response()
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Redirect::to("/?error=missing").into_response()
        }
        Err(err) => {
            error!(?err, file = %path.display(), "failed to delete photo");
            responses::error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "The photo could not be deleted.",
            )
        }
    }
}
