use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use super::session::Session;
use crate::flash::{FlashLevel, LOGIN_REQUIRED};

/// Username of the logged-in user, placed in request extensions by [`require_login`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

/// Outcome of the login guard.
#[derive(Debug)]
pub enum Access {
    Granted(CurrentUser),
    Denied,
}

pub fn guard(session: &Session) -> Access {
    match session.current_username() {
        Some(name) if session.is_authenticated() => Access::Granted(CurrentUser(name.to_string())),
        _ => Access::Denied,
    }
}

/// Middleware in front of the member-only routes.
pub async fn require_login(mut session: Session, mut request: Request, next: Next) -> Response {
    match guard(&session) {
        Access::Granted(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Access::Denied => {
            debug!(path = %request.uri().path(), "anonymous request to protected route");
            session.flash(FlashLevel::Danger, LOGIN_REQUIRED);
            (session, Redirect::to("/login")).into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| Redirect::to("/login"))
    }
}
