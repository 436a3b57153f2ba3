use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::ingest::IngestError;
use crate::web::templates;

/// The single boundary translating pipeline outcomes into transport
/// responses. Nothing inside the pipeline knows about status codes.
pub fn ingest_error(err: &IngestError) -> Response {
    match err {
        IngestError::Unauthenticated => Redirect::to("/login").into_response(),
        IngestError::MissingLength
        | IngestError::TruncatedInput { .. }
        | IngestError::MalformedBody(_) => {
            error_page(StatusCode::BAD_REQUEST, "Upload rejected", &err.to_string())
        }
        IngestError::UnsupportedFormat(_) => error_page(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported file type",
            &err.to_string(),
        ),
        IngestError::InvalidImage(_) => error_page(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Not a valid image",
            &err.to_string(),
        ),
        IngestError::Storage(source) => {
            error!(%source, "upload failed in storage");
            error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error",
                "The photo could not be stored. Try again later.",
            )
        }
    }
}

pub fn error_page(status: StatusCode, title: &str, message: &str) -> Response {
    (status, Html(templates::render_error_page(title, message))).into_response()
}

pub fn too_large(declared: u64, limit: u64) -> Response {
    error_page(
        StatusCode::PAYLOAD_TOO_LARGE,
        "Upload too large",
        &format!("The upload declares {declared} bytes; the limit is {limit}."),
    )
}

#[cfg(test)]
mod tests {
    use axum::http::header;

    use super::*;

    #[test]
    fn unauthenticated_redirects_to_login() {
        let response = ingest_error(&IngestError::Unauthenticated);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
    }

    #[test]
    fn client_framing_errors_are_bad_requests() {
        for err in [
            IngestError::MissingLength,
            IngestError::TruncatedInput {
                declared: 100,
                received: 10,
            },
            IngestError::MalformedBody("bad".to_string()),
        ] {
            assert_eq!(ingest_error(&err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn format_and_image_errors_have_distinct_statuses() {
        let unsupported = ingest_error(&IngestError::UnsupportedFormat("png".to_string()));
        assert_eq!(unsupported.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let invalid = image::load_from_memory_with_format(b"junk", image::ImageFormat::Jpeg)
            .map(|_| ())
            .unwrap_err();
        let response = ingest_error(&IngestError::InvalidImage(invalid));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn storage_failures_are_server_errors() {
        let response = ingest_error(&IngestError::Storage(anyhow::anyhow!("disk gone")));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn oversized_declarations_are_too_large() {
        assert_eq!(
            too_large(20_000_000, 10_000_000).status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }
}
