use std::sync::Arc;

use crate::db::repository::CommentRepository;
use crate::models::{Comment, NewComment, RecentComment};
use crate::Result;

/// How many recent comments a profile page lists.
pub const LAST_COMMENTS_LIMIT: u32 = 5;

pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(comment_repo: Arc<dyn CommentRepository>) -> Self {
        Self { comment_repo }
    }

    pub async fn create_comment(&self, comment: NewComment) -> Result<Comment> {
        self.comment_repo.create_comment(&comment).await
    }

    /// The author's latest comments, newest first, with their post titles.
    pub async fn last_comments(&self, author_id: i64) -> Result<Vec<RecentComment>> {
        self.comment_repo
            .find_latest_by_author(author_id, LAST_COMMENTS_LIMIT)
            .await
    }
}
