use chrono::{Datelike, Utc};

use crate::gallery::PhotoEntry;

const BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; min-height: 100vh; display: flex; flex-direction: column; }
        header { background: #ffffff; padding: 1.75rem 1.5rem; border-bottom: 1px solid #e2e8f0; display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        header h1 { margin: 0; font-size: 1.6rem; }
        .header-actions { display: flex; align-items: center; gap: 1rem; }
        .header-actions span { color: #475569; font-size: 0.95rem; }
        main { flex: 1; padding: 2rem 1.5rem; max-width: 1100px; margin: 0 auto; width: 100%; box-sizing: border-box; }
        .flash { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash.error { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); margin-bottom: 2rem; }
        .panel h2 { margin-top: 0; }
        .photo-grid { display: grid; gap: 1.25rem; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); }
        .photo-container { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 0.75rem; box-shadow: 0 12px 30px rgba(15, 23, 42, 0.06); }
        .photo-container img { width: 100%; border-radius: 8px; display: block; }
        .photo-container form { margin: 0.75rem 0 0; }
        button { padding: 0.6rem 1.1rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; transition: background 0.15s ease; }
        button:hover { background: #1d4ed8; }
        button.danger { background: #dc2626; }
        button.danger:hover { background: #b91c1c; }
        input[type="file"] { display: block; margin: 0.75rem 0 1.25rem; }
        .note { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
"#;

pub fn render_gallery_page(username: &str, photos: &[PhotoEntry], flash: &str) -> String {
    let username = escape_html(username);

    let photo_cards = photos
        .iter()
        .map(|photo| {
            let name = escape_html(&photo.file_name);
            format!(
                r#"            <div class="photo-container">
                <img src="/photos/{name}" alt="Photo">
                <form method="post" action="/photos/{name}/delete">
                    <button type="submit" class="danger">Delete</button>
                </form>
            </div>
"#,
            )
        })
        .collect::<String>();

    let grid = if photo_cards.is_empty() {
        r#"<p class="note">Nothing here yet. Post the first photo.</p>"#.to_string()
    } else {
        format!(
            r#"<div class="photo-grid" id="photo-grid">
{photo_cards}        </div>"#,
        )
    };

    let footer = render_footer();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Shutterbox</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{BASE_STYLES}
    </style>
</head>
<body>
    <header>
        <h1>Shutterbox</h1>
        <div class="header-actions">
            <span>Signed in as <strong>{username}</strong></span>
            <form method="post" action="/logout">
                <button type="submit">Sign out</button>
            </form>
        </div>
    </header>
    <main>
        {flash}
        <section class="panel">
            <h2>Post a photo</h2>
            <form enctype="multipart/form-data" method="post" action="/photos">
                <input type="file" name="file" accept=".jpg" required>
                <button type="submit">Post photo</button>
            </form>
            <p class="note">JPEG only. The file is checked before it is stored.</p>
        </section>
        <section>
            {grid}
        </section>
        {footer}
    </main>
</body>
</html>"#,
    )
}

pub fn render_login_page(flash: &str) -> String {
    let footer = render_footer();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sign in | Shutterbox</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="robots" content="noindex,nofollow">
    <style>
{BASE_STYLES}
        body {{ align-items: center; justify-content: center; }}
        main {{ max-width: 480px; }}
    </style>
</head>
<body>
    <main>
        {flash}
        <section class="panel">
            <h1>Sign in</h1>
            <p class="note">Paste the session token you were issued. Accounts and tokens are provisioned separately.</p>
            <form method="post" action="/login">
                <label for="token">Session token</label>
                <input id="token" name="token" required style="width: 100%; padding: 0.75rem; margin: 0.5rem 0 1.25rem; border-radius: 8px; border: 1px solid #cbd5f5; box-sizing: border-box;">
                <button type="submit">Sign in</button>
            </form>
        </section>
        {footer}
    </main>
</body>
</html>"#,
    )
}

pub fn render_error_page(title: &str, message: &str) -> String {
    let title = escape_html(title);
    let message = escape_html(message);
    let footer = render_footer();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} | Shutterbox</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{BASE_STYLES}
    </style>
</head>
<body>
    <main>
        <section class="panel">
            <h1>{title}</h1>
            <p class="note">{message}</p>
            <p><a href="/">Back to the gallery</a></p>
        </section>
        {footer}
    </main>
</body>
</html>"#,
    )
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(r#"<footer class="app-footer">© {current_year} Shutterbox</footer>"#)
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
