use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;

use crate::gallery;
use crate::web::{AppState, auth, responses, templates};

#[derive(Default, Deserialize)]
pub struct GalleryQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

pub async fn gallery_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<GalleryQuery>,
) -> Result<Response, Redirect> {
    let username = auth::require_user(&state, &jar).await?;

    let cfg = state.ingest_config();
    let photos = match gallery::list_photos(&cfg.upload_dir, &cfg.accepted_extension).await {
        Ok(photos) => photos,
        Err(err) => {
            error!(?err, "failed to list photos");
            return Ok(responses::error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "The gallery could not be loaded.",
            ));
        }
    };

    let flash = compose_gallery_flash(&params);
    Ok(Html(templates::render_gallery_page(&username, &photos, &flash)).into_response())
}

fn compose_gallery_flash(params: &GalleryQuery) -> String {
    if let Some(status) = params.status.as_deref() {
        let message = match status {
            "uploaded" => "Photo uploaded.",
            "deleted" => "Photo deleted.",
            _ => return String::new(),
        };
        return format!(r#"<div class="flash success">{message}</div>"#);
    }

    if let Some(error) = params.error.as_deref() {
        let message = match error {
            "missing" => "That photo no longer exists.",
            _ => "Something went wrong. Try again.",
        };
        return format!(r#"<div class="flash error">{message}</div>"#);
    }

    String::new()
}
