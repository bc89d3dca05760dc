use sqlx::FromRow;

/// Article record in the database.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub author: String, // username of the creator
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub content: String,
}
