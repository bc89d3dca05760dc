use std::sync::Arc;

use axum::extract::FromRef;

use crate::articles::repo::{ArticleStore, PgArticleStore};
use crate::auth::repo::{PgUserStore, UserStore};
use crate::auth::session::SessionKeys;
use crate::config::AppConfig;
use crate::db;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session_keys: SessionKeys,
    pub users: Arc<dyn UserStore>,
    pub articles: Arc<dyn ArticleStore>,
}

impl AppState {
    /// Connect to the database and assemble the production state.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;
        if config.run_migrations {
            db::migrate(&pool).await?;
        }

        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgArticleStore::new(pool)),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        articles: Arc<dyn ArticleStore>,
    ) -> Self {
        let session_keys = SessionKeys::new(&config.session);
        Self {
            config,
            session_keys,
            users,
            articles,
        }
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        state.session_keys.clone()
    }
}
