pub mod auth;
pub mod gallery_ui;
pub mod photos;
pub mod responses;
pub mod router;
pub mod state;
pub mod templates;

pub use auth::{SESSION_COOKIE, SESSION_TTL_DAYS};
pub use state::AppState;
pub use templates::escape_html;
