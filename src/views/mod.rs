//! Server-rendered pages.
//!
//! Every page goes through [`layout`], which adds the navigation bar for the
//! current login state and the pending flash messages. Templates are maud
//! `html!` blocks, so interpolated text is escaped on the way out.

mod articles;
mod auth;
mod pages;

pub use articles::{article_detail, article_form, article_list, dashboard, ArticleFormView};
pub use auth::{login_form, register_form, RegisterFormView};
pub use pages::{about, home};

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::auth::session::Session;
use crate::flash::Flash;
use crate::validation::ValidationErrors;

/// Per-request page furniture: who is logged in and what to announce.
#[derive(Debug, Default)]
pub struct Chrome {
    pub username: Option<String>,
    pub flashes: Vec<Flash>,
}

impl Chrome {
    /// Consumes the pending flashes; the session must be returned with the response.
    pub fn from_session(session: &mut Session) -> Self {
        Self {
            username: session.current_username().map(str::to_string),
            flashes: session.take_flashes(),
        }
    }
}

const CSS: &str = r#"
    body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 0; background: #f7f7f7; color: #222; }
    nav { background: #343a40; padding: 10px 20px; display: flex; gap: 16px; align-items: center; }
    nav a { color: #fff; text-decoration: none; }
    nav .right { margin-left: auto; display: flex; gap: 16px; align-items: center; }
    main { max-width: 860px; margin: 24px auto; background: #fff; padding: 24px; border-radius: 8px; }
    .alert { padding: 10px 14px; border-radius: 6px; margin-bottom: 12px; }
    .alert-success { background: #d4edda; }
    .alert-danger { background: #f8d7da; }
    .alert-warning { background: #fff3cd; }
    .error { color: #b00020; font-size: 0.9em; }
    table { width: 100%; border-collapse: collapse; }
    td, th { border-bottom: 1px solid #ddd; padding: 8px; text-align: left; }
    label { display: block; margin-top: 12px; }
    input[type=text], input[type=email], input[type=password], textarea { width: 100%; padding: 6px; }
"#;

fn nav(username: Option<&str>) -> Markup {
    html! {
        nav {
            a href="/" { "Home" }
            a href="/about" { "About" }
            a href="/articles" { "Articles" }
            form method="POST" action="/search" {
                input type="text" name="keyword" placeholder="Search titles";
            }
            div.right {
                @if let Some(name) = username {
                    a href="/dashboard" { "Dashboard" }
                    a href="/addarticle" { "Add article" }
                    span { (name) }
                    a href="/logout" { "Logout" }
                } @else {
                    a href="/login" { "Login" }
                    a href="/register" { "Register" }
                }
            }
        }
    }
}

fn flashes(flashes: &[Flash]) -> Markup {
    html! {
        @for f in flashes {
            div class={ "alert " (f.level.css_class()) } { (f.message) }
        }
    }
}

pub(crate) fn field_errors(errors: &ValidationErrors, field: &str) -> Markup {
    html! {
        @for e in errors.for_field(field) {
            div.error { (e) }
        }
    }
}

pub fn layout(title: &str, chrome: &Chrome, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width,initial-scale=1";
                title { (title) " | Articles" }
                style { (PreEscaped(CSS)) }
            }
            body {
                (nav(chrome.username.as_deref()))
                main {
                    (flashes(&chrome.flashes))
                    (body)
                }
            }
        }
    }
}

pub fn server_error() -> Markup {
    layout(
        "Error",
        &Chrome::default(),
        html! {
            h1 { "Something went wrong" }
            p { "Please try again later." }
        },
    )
}
