use axum::{
    Router,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::web::{AppState, auth, gallery_ui, photos};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(gallery_ui::gallery_page))
        .route("/login", get(auth::login_page).post(auth::process_login))
        .route("/logout", post(auth::logout))
        .route("/photos", post(photos::upload_photo))
        .route("/photos/:name", get(photos::serve_photo))
        .route("/photos/:name/delete", post(photos::delete_photo))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
