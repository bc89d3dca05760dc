use serde::Deserialize;

use crate::validation::FormFields;

/// Body of `POST /addarticle` and `POST /edit/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ArticleForm {
    pub title: String,
    pub content: String,
}

impl FormFields for ArticleForm {
    fn value(&self, name: &str) -> &str {
        match name {
            "title" => &self.title,
            "content" => &self.content,
            _ => "",
        }
    }
}

/// Body of `POST /search`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub keyword: String,
}

/// Article ids arrive as raw path text; anything that is not an id matches nothing.
pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
