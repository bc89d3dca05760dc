use axum::{
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::{
    auth::session::Session,
    state::AppState,
    views::{self, Chrome},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/health", get(health))
}

pub async fn health(session: Session) -> Response {
    (session, "ok").into_response()
}

pub async fn home(mut session: Session) -> Response {
    let chrome = Chrome::from_session(&mut session);
    (session, views::home(&chrome)).into_response()
}

pub async fn about(mut session: Session) -> Response {
    let chrome = Chrome::from_session(&mut session);
    (session, views::about(&chrome)).into_response()
}
