use std::sync::Arc;

use crate::db::repository::{CategoryRepository, PostRepository};
use crate::models::{Category, NewPost, Post};
use crate::pagination::{Page, PageRequest};
use crate::Result;

pub struct PostService {
    post_repo: Arc<dyn PostRepository>,
    category_repo: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub fn new(post_repo: Arc<dyn PostRepository>, category_repo: Arc<dyn CategoryRepository>) -> Self {
        Self {
            post_repo,
            category_repo,
        }
    }

    pub async fn create_post(&self, post: NewPost) -> Result<Post> {
        let created = self.post_repo.create_post(&post).await?;
        tracing::debug!("Created post {} for user {}", created.id, created.author_id);
        Ok(created)
    }

    pub async fn approved_posts(&self, author_id: i64) -> Result<Vec<Post>> {
        self.post_repo.find_approved_user_posts(author_id).await
    }

    /// A page of the author's posts. Unapproved posts are only included
    /// when the author is looking at their own list.
    pub async fn user_posts_page(
        &self,
        author_id: i64,
        include_unapproved: bool,
        request: PageRequest,
    ) -> Result<Page<Post>> {
        if include_unapproved {
            let total = self.post_repo.count_user_posts(author_id).await?;
            let items = self
                .post_repo
                .find_user_posts(author_id, request.limit(), request.offset())
                .await?;
            Ok(Page::new(items, request, total))
        } else {
            let approved = self.post_repo.find_approved_user_posts(author_id).await?;
            Ok(Page::from_vec(approved, request))
        }
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.category_repo.find_all().await
    }

    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.category_repo.create_category(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{InMemoryCategoryRepository, InMemoryPostRepository};
    use crate::pagination::USER_POSTS_PER_PAGE;

    async fn seeded() -> PostService {
        let service = PostService::new(
            Arc::new(InMemoryPostRepository::new()),
            Arc::new(InMemoryCategoryRepository::new()),
        );
        for i in 1..=6 {
            service
                .create_post(NewPost {
                    title: format!("Post {}", i),
                    content: "body".to_string(),
                    author_id: 1,
                    category_id: None,
                    is_approved: i % 2 == 0,
                })
                .await
                .unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_author_sees_all_posts() {
        let service = seeded().await;
        let request = PageRequest::new(1, USER_POSTS_PER_PAGE).unwrap();
        let page = service.user_posts_page(1, true, request).await.unwrap();

        assert_eq!(page.total_items, 6);
        assert_eq!(page.items.len(), 4);
        assert_eq!(page.page_count(), 2);
        assert_eq!(page.items[0].title, "Post 6");
    }

    #[tokio::test]
    async fn test_visitors_see_approved_posts_only() {
        let service = seeded().await;
        let request = PageRequest::new(1, USER_POSTS_PER_PAGE).unwrap();
        let page = service.user_posts_page(1, false, request).await.unwrap();

        assert_eq!(page.total_items, 3);
        assert!(page.items.iter().all(|p| p.is_approved));
    }

    #[tokio::test]
    async fn test_categories_sorted() {
        let service = seeded().await;
        service.create_category("Travel").await.unwrap();
        service.create_category("Food").await.unwrap();

        let names: Vec<String> = service.categories().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Food", "Travel"]);
    }
}
