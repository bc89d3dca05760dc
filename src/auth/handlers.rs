use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        password::{hash_password, verify_password},
        repo_types::NewUser,
        session::Session,
    },
    error::AppError,
    flash::FlashLevel,
    state::AppState,
    validation::{ValidationErrors, REGISTER_FORM},
    views::{self, Chrome, RegisterFormView},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_page).post(register))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
}

pub async fn register_page(mut session: Session) -> Response {
    let chrome = Chrome::from_session(&mut session);
    let html = views::register_form(&chrome, &RegisterFormView::default());
    (session, html).into_response()
}

fn rerender_register(mut session: Session, form: &RegisterForm, errors: ValidationErrors) -> Response {
    let chrome = Chrome::from_session(&mut session);
    let view = RegisterFormView {
        name: &form.name,
        username: &form.username,
        email: &form.email,
        errors,
    };
    (session, views::register_form(&chrome, &view)).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let errors = REGISTER_FORM.validate(&form);
    if !errors.is_ok() {
        warn!(username = %form.username, "registration rejected by validation");
        return Ok(rerender_register(session, &form, errors));
    }

    if state.users.find_by_username(&form.username).await?.is_some() {
        warn!(username = %form.username, "username already registered");
        let mut errors = ValidationErrors::default();
        errors.add("username", "This username is already taken.");
        return Ok(rerender_register(session, &form, errors));
    }

    let password_hash = hash_password(&form.password)?;
    let new_user = NewUser {
        name: form.name.trim().to_string(),
        email: form.email.trim().to_string(),
        username: form.username.clone(),
        password_hash,
    };

    let user = match state.users.insert(&new_user).await {
        Ok(u) => u,
        Err(AppError::UsernameTaken) => {
            warn!(username = %form.username, "username registered concurrently");
            let mut errors = ValidationErrors::default();
            errors.add("username", "This username is already taken.");
            return Ok(rerender_register(session, &form, errors));
        }
        Err(e) => return Err(e),
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    session.flash(
        FlashLevel::Success,
        "Your account has been created. You can now log in.",
    );
    Ok((session, Redirect::to("/login")).into_response())
}

pub async fn login_page(mut session: Session) -> Response {
    let chrome = Chrome::from_session(&mut session);
    (session, views::login_form(&chrome)).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let uniform = state.config.uniform_login_errors;

    let Some(user) = state.users.find_by_username(&form.username).await? else {
        warn!(username = %form.username, "login unknown user");
        let msg = if uniform { "Invalid username or password." } else { "Invalid user." };
        session.flash(FlashLevel::Danger, msg);
        return Ok((session, Redirect::to("/login")).into_response());
    };

    let ok = match verify_password(&form.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            // Unusable stored hash: refuse the login, keep serving.
            error!(error = %e, user_id = user.id, "stored password hash is malformed");
            false
        }
    };

    if !ok {
        warn!(user_id = user.id, "login invalid password");
        let msg = if uniform { "Invalid username or password." } else { "Wrong password." };
        session.flash(FlashLevel::Danger, msg);
        return Ok((session, Redirect::to("/login")).into_response());
    }

    session.login(&user.username);
    session.flash(FlashLevel::Success, "You logged in successfully.");
    info!(user_id = user.id, sid = %session.sid(), "user logged in");
    Ok((session, Redirect::to("/")).into_response())
}

pub async fn logout(mut session: Session) -> Response {
    if let Some(name) = session.current_username() {
        info!(username = %name, sid = %session.sid(), "user logged out");
    }
    session.logout();
    (session, Redirect::to("/")).into_response()
}
