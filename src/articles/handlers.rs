use axum::{
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{parse_id, ArticleForm, SearchForm};
use super::repo_types::NewArticle;
use crate::{
    auth::{
        extractors::{require_login, CurrentUser},
        session::Session,
    },
    error::AppError,
    flash::{FlashLevel, NOT_PERMITTED},
    state::AppState,
    validation::{ValidationErrors, ARTICLE_FORM},
    views::{self, ArticleFormView, Chrome},
};

// --- routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/article/:id", get(show_article))
        .route("/search", get(search_page).post(search))
}

pub fn member_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/addarticle", get(add_article_page).post(add_article))
        .route("/delete/:id", get(delete_article))
        .route("/edit/:id", get(edit_article_page).post(edit_article))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_login))
}

// --- public handlers ---

#[instrument(skip(state, session))]
pub async fn list_articles(
    State(state): State<AppState>,
    mut session: Session,
) -> Result<Response, AppError> {
    let articles = state.articles.find_all().await?;
    let chrome = Chrome::from_session(&mut session);
    Ok((session, views::article_list(&chrome, &articles)).into_response())
}

#[instrument(skip(state, session))]
pub async fn show_article(
    State(state): State<AppState>,
    mut session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let article = match parse_id(&id) {
        Some(id) => state.articles.find_by_id(id).await?,
        None => None,
    };
    let chrome = Chrome::from_session(&mut session);
    Ok((session, views::article_detail(&chrome, article.as_ref())).into_response())
}

pub async fn search_page(session: Session) -> Response {
    (session, Redirect::to("/")).into_response()
}

#[instrument(skip(state, session, form))]
pub async fn search(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<SearchForm>,
) -> Result<Response, AppError> {
    let articles = state.articles.find_by_title_substring(&form.keyword).await?;
    if articles.is_empty() {
        info!(keyword = %form.keyword, "search found nothing");
        session.flash(FlashLevel::Warning, "No articles match your search.");
        return Ok((session, Redirect::to("/articles")).into_response());
    }
    let chrome = Chrome::from_session(&mut session);
    Ok((session, views::article_list(&chrome, &articles)).into_response())
}

// --- member handlers ---

#[instrument(skip(state, session))]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    mut session: Session,
) -> Result<Response, AppError> {
    let articles = state.articles.find_by_author(&username).await?;
    let chrome = Chrome::from_session(&mut session);
    Ok((session, views::dashboard(&chrome, &articles)).into_response())
}

fn render_article_form(
    mut session: Session,
    heading: &str,
    action: String,
    form: &ArticleForm,
    errors: ValidationErrors,
) -> Response {
    let chrome = Chrome::from_session(&mut session);
    let view = ArticleFormView {
        heading,
        action,
        title: &form.title,
        content: &form.content,
        errors,
    };
    (session, views::article_form(&chrome, &view)).into_response()
}

fn refuse(mut session: Session) -> Response {
    session.flash(FlashLevel::Danger, NOT_PERMITTED);
    (session, Redirect::to("/")).into_response()
}

pub async fn add_article_page(session: Session) -> Response {
    render_article_form(
        session,
        "Add article",
        "/addarticle".into(),
        &ArticleForm::default(),
        ValidationErrors::default(),
    )
}

#[instrument(skip(state, session, form))]
pub async fn add_article(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    mut session: Session,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    let errors = ARTICLE_FORM.validate(&form);
    if !errors.is_ok() {
        return Ok(render_article_form(
            session,
            "Add article",
            "/addarticle".into(),
            &form,
            errors,
        ));
    }

    let article = state
        .articles
        .insert(&NewArticle {
            title: form.title,
            author: username,
            content: form.content,
        })
        .await?;

    info!(article_id = article.id, author = %article.author, "article created");
    session.flash(FlashLevel::Success, "Article added successfully.");
    Ok((session, Redirect::to("/dashboard")).into_response())
}

#[instrument(skip(state, session))]
pub async fn delete_article(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let deleted = match parse_id(&id) {
        Some(id) => state.articles.delete_by_id(id, &username).await?,
        None => 0,
    };
    if deleted == 0 {
        warn!(%id, %username, "delete refused: missing or not owned");
        return Ok(refuse(session));
    }
    info!(%id, %username, "article deleted");
    Ok((session, Redirect::to("/dashboard")).into_response())
}

#[instrument(skip(state, session))]
pub async fn edit_article_page(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let article = match parse_id(&id) {
        Some(id) => state.articles.find_owned(id, &username).await?,
        None => None,
    };
    let Some(article) = article else {
        warn!(%id, %username, "edit refused: missing or not owned");
        return Ok(refuse(session));
    };
    let form = ArticleForm {
        title: article.title,
        content: article.content,
    };
    Ok(render_article_form(
        session,
        "Edit article",
        format!("/edit/{}", article.id),
        &form,
        ValidationErrors::default(),
    ))
}

#[instrument(skip(state, session, form))]
pub async fn edit_article(
    State(state): State<AppState>,
    CurrentUser(username): CurrentUser,
    mut session: Session,
    Path(id): Path<String>,
    Form(form): Form<ArticleForm>,
) -> Result<Response, AppError> {
    let Some(article_id) = parse_id(&id) else {
        warn!(%id, %username, "edit refused: not an article id");
        return Ok(refuse(session));
    };

    if state.articles.find_owned(article_id, &username).await?.is_none() {
        warn!(article_id, %username, "edit refused: missing or not owned");
        return Ok(refuse(session));
    }

    let errors = ARTICLE_FORM.validate(&form);
    if !errors.is_ok() {
        return Ok(render_article_form(
            session,
            "Edit article",
            format!("/edit/{article_id}"),
            &form,
            errors,
        ));
    }

    // The author filter on the update covers a delete racing this request.
    let updated = state
        .articles
        .update_by_id(article_id, &username, &form.title, &form.content)
        .await?;
    if updated == 0 {
        warn!(article_id, %username, "update refused: missing or not owned");
        return Ok(refuse(session));
    }

    info!(article_id, %username, "article updated");
    session.flash(FlashLevel::Success, "Article updated.");
    Ok((session, Redirect::to("/dashboard")).into_response())
}
