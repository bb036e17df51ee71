use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub is_approved: bool, // Only approved posts are visible to other users
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub is_approved: bool,
}

impl Post {
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            return self.content.clone();
        }
        let mut cut: String = self.content.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt() {
        let post = Post {
            id: 1,
            title: "t".to_string(),
            content: "héllo world".to_string(),
            author_id: 1,
            category_id: None,
            is_approved: true,
            created_at: Utc::now(),
        };
        assert_eq!(post.excerpt(5), "héllo…");
        assert_eq!(post.excerpt(50), "héllo world");
    }
}
