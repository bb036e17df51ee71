use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub post_id: i64,
    pub author_id: i64,
    pub content: String,
}

/// A comment joined with the title of the post it was left on.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RecentComment {
    pub id: i64,
    pub post_id: i64,
    pub post_title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
