use async_trait::async_trait;
use sqlx::PgPool;

use crate::articles::repo_types::{Article, NewArticle};
use crate::error::AppError;

/// Access to the `articles` table.
///
/// Lists are ordered by id. Mutations take the acting username and only
/// touch rows whose `author` matches; they return the affected-row count.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn insert(&self, article: &NewArticle) -> Result<Article, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, AppError>;
    async fn find_owned(&self, id: i64, author: &str) -> Result<Option<Article>, AppError>;
    async fn find_all(&self) -> Result<Vec<Article>, AppError>;
    async fn find_by_author(&self, author: &str) -> Result<Vec<Article>, AppError>;
    async fn find_by_title_substring(&self, keyword: &str) -> Result<Vec<Article>, AppError>;
    async fn update_by_id(
        &self,
        id: i64,
        author: &str,
        title: &str,
        content: &str,
    ) -> Result<u64, AppError>;
    async fn delete_by_id(&self, id: i64, author: &str) -> Result<u64, AppError>;
}

/// Turn a search keyword into a LIKE pattern that matches it literally.
pub fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct PgArticleStore {
    db: PgPool,
}

impl PgArticleStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn insert(&self, article: &NewArticle) -> Result<Article, AppError> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO articles (title, author, content)
            VALUES ($1, $2, $3)
            RETURNING id, title, author, content
            "#,
        )
        .bind(&article.title)
        .bind(&article.author)
        .bind(&article.content)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Article>, AppError> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, content
            FROM articles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_owned(&self, id: i64, author: &str) -> Result<Option<Article>, AppError> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, content
            FROM articles
            WHERE id = $1 AND author = $2
            "#,
        )
        .bind(id)
        .bind(author)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<Article>, AppError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, content
            FROM articles
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Article>, AppError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, content
            FROM articles
            WHERE author = $1
            ORDER BY id
            "#,
        )
        .bind(author)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_title_substring(&self, keyword: &str) -> Result<Vec<Article>, AppError> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT id, title, author, content
            FROM articles
            WHERE title LIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(like_pattern(keyword))
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn update_by_id(
        &self,
        id: i64,
        author: &str,
        title: &str,
        content: &str,
    ) -> Result<u64, AppError> {
        let res = sqlx::query(
            r#"
            UPDATE articles
            SET title = $1, content = $2
            WHERE id = $3 AND author = $4
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(id)
        .bind(author)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected())
    }

    async fn delete_by_id(&self, id: i64, author: &str) -> Result<u64, AppError> {
        let res = sqlx::query(
            r#"
            DELETE FROM articles
            WHERE id = $1 AND author = $2
            "#,
        )
        .bind(id)
        .bind(author)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected())
    }
}
