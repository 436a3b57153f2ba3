use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cookie::time::Duration as CookieDuration;
use serde::Deserialize;
use tracing::error;

use crate::web::{AppState, templates};

pub const SESSION_COOKIE: &str = "session_token";
pub const SESSION_TTL_DAYS: i64 = 7;

/// Resolves the session cookie to a username, or redirects to the sign-in
/// page. Handlers call this before doing anything else.
pub async fn require_user(state: &AppState, jar: &CookieJar) -> Result<String, Redirect> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Err(Redirect::to("/login"));
    };
    match state.sessions().lookup(cookie.value()).await {
        Ok(Some(username)) => Ok(username),
        Ok(None) => Err(Redirect::to("/login")),
        Err(err) => {
            error!(?err, "failed to read session store");
            Err(Redirect::to("/login"))
        }
    }
}

#[derive(Default, Deserialize)]
pub struct LoginQuery {
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub token: String,
}

pub async fn login_page(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LoginQuery>,
) -> Result<Html<String>, Redirect> {
    if let Some(redirect) = redirect_if_authenticated(&state, &jar).await {
        return Err(redirect);
    }

    let flash = match params.status.as_deref() {
        Some("signed_out") => r#"<div class="flash success">Signed out.</div>"#,
        _ => "",
    };
    Ok(Html(templates::render_login_page(flash)))
}

/// Installs an externally issued session token as the session cookie.
///
/// Tokens are never minted here; a token the store does not know is turned
/// away without setting anything.
pub async fn process_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), (StatusCode, Html<String>)> {
    let token = form.token.trim();

    match state.sessions().lookup(token).await {
        Ok(Some(_)) => {
            let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
            cookie.set_path("/");
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            cookie.set_max_age(CookieDuration::days(SESSION_TTL_DAYS));

            Ok((jar.add(cookie), Redirect::to("/")))
        }
        Ok(None) => Err((
            StatusCode::UNAUTHORIZED,
            Html(templates::render_login_page(
                r#"<div class="flash error">That token is not recognized.</div>"#,
            )),
        )),
        Err(err) => {
            error!(?err, "failed to verify login token");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(templates::render_error_page(
                    "Server error",
                    "The token could not be verified. Try again later.",
                )),
            ))
        }
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    // The session store is read-only here; signing out just drops the cookie.
    let mut removal = Cookie::new(SESSION_COOKIE, "");
    removal.set_path("/");
    removal.set_http_only(true);
    removal.set_same_site(SameSite::Lax);
    removal.set_max_age(CookieDuration::seconds(0));

    (jar.remove(removal), Redirect::to("/login?status=signed_out"))
}

async fn redirect_if_authenticated(state: &AppState, jar: &CookieJar) -> Option<Redirect> {
    let cookie = jar.get(SESSION_COOKIE)?;
    match state.sessions().lookup(cookie.value()).await {
        Ok(Some(_)) => Some(Redirect::to("/")),
        _ => None,
    }
}
