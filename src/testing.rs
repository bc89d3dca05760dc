//! In-memory stores and a cookie-keeping client for router-level tests.

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc, Mutex,
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        Request, StatusCode,
    },
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::{
    app::build_app,
    articles::{
        repo::ArticleStore,
        repo_types::{Article, NewArticle},
    },
    auth::{
        password::hash_password,
        repo::UserStore,
        repo_types::{NewUser, User},
    },
    config::{AppConfig, SessionConfig},
    error::AppError,
    state::AppState,
};

#[derive(Default)]
pub struct MemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl MemoryUsers {
    pub fn all(&self) -> Vec<User> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn insert(&self, user: &NewUser) -> Result<User, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.username == user.username) {
            return Err(AppError::UsernameTaken);
        }
        let row = User {
            id: rows.len() as i64 + 1,
            name: user.name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|u| u.username == username).cloned())
    }
}

#[derive(Default)]
pub struct MemoryArticles {
    rows: Mutex<Vec<Article>>,
    last_id: AtomicI64,
}

impl MemoryArticles {
    pub fn all(&self) -> Vec<Article> {
        self.rows.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn select<P: Fn(&Article) -> bool>(&self, pred: P) -> Vec<Article> {
        let mut found: Vec<Article> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| pred(a))
            .cloned()
            .collect();
        found.sort_by_key(|a| a.id);
        found
    }
}

#[async_trait]
impl ArticleStore for MemoryArticles {
    async fn insert(&self, article: &NewArticle) -> Result<Article, AppError> {
        let row = Article {
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            title: article.title.clone(),
            author: article.author.clone(),
            content: article.content.clone(),
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, AppError> {
        Ok(self.select(|a| a.id == id).into_iter().next())
    }

    async fn find_owned(&self, id: i64, author: &str) -> Result<Option<Article>, AppError> {
        Ok(self
            .select(|a| a.id == id && a.author == author)
            .into_iter()
            .next())
    }

    async fn find_all(&self) -> Result<Vec<Article>, AppError> {
        Ok(self.select(|_| true))
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Article>, AppError> {
        Ok(self.select(|a| a.author == author))
    }

    async fn find_by_title_substring(&self, keyword: &str) -> Result<Vec<Article>, AppError> {
        Ok(self.select(|a| a.title.contains(keyword)))
    }

    async fn update_by_id(
        &self,
        id: i64,
        author: &str,
        title: &str,
        content: &str,
    ) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let mut affected = 0;
        for a in rows.iter_mut().filter(|a| a.id == id && a.author == author) {
            a.title = title.to_string();
            a.content = content.to_string();
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_by_id(&self, id: i64, author: &str) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|a| !(a.id == id && a.author == author));
        Ok((before - rows.len()) as u64)
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        max_connections: 1,
        run_migrations: false,
        host: "127.0.0.1".into(),
        port: 0,
        session: SessionConfig {
            secret: "test-session-secret-test-session-secret".into(),
            issuer: "articlehub-test".into(),
            cookie_name: "session".into(),
            ttl_minutes: 30,
            secure_cookie: false,
        },
        uniform_login_errors: false,
    }
}

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUsers>,
    pub articles: Arc<MemoryArticles>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let users = Arc::new(MemoryUsers::default());
        let articles = Arc::new(MemoryArticles::default());
        let state = AppState::from_parts(Arc::new(config), users.clone(), articles.clone());
        Self {
            router: build_app(state),
            users,
            articles,
        }
    }

    /// Insert a user directly, bypassing the registration form.
    pub async fn seed_user(&self, username: &str, password: &str) {
        let hash = hash_password(password).expect("hash seed password");
        self.users
            .insert(&NewUser {
                name: format!("{username} Tester"),
                email: format!("{username}@example.com"),
                username: username.into(),
                password_hash: hash,
            })
            .await
            .expect("seed user");
    }

    pub async fn seed_article(&self, author: &str, title: &str, content: &str) -> Article {
        self.articles
            .insert(&NewArticle {
                title: title.into(),
                author: author.into(),
                content: content.into(),
            })
            .await
            .expect("seed article")
    }

    pub fn client(&self) -> TestClient {
        TestClient {
            router: self.router.clone(),
            cookie: None,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

/// Keeps the session cookie between requests, like a browser would.
pub struct TestClient {
    router: Router,
    pub cookie: Option<String>,
}

impl TestClient {
    pub async fn get(&mut self, path: &str) -> TestResponse {
        let req = Request::builder().method("GET").uri(path);
        self.send(req, Body::empty()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(req, Body::from(body)).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    async fn send(&mut self, mut req: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            req = req.header(COOKIE, cookie.as_str());
        }
        let res = self
            .router
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();

        for value in res.headers().get_all(SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap_or_default().trim();
            let removed = raw.contains("Max-Age=0") || pair.ends_with('=');
            self.cookie = if removed { None } else { Some(pair.to_string()) };
        }

        let status = res.status();
        let location = res
            .headers()
            .get(LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

fn form_encode(raw: &str) -> String {
    let mut out = String::new();
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
