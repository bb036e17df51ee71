pub mod postgres;
pub mod repository;

// Database connection and state management
use std::sync::Arc;

use crate::config::AppConfig;
use crate::Result;
use postgres::PostgresDatabase;
use repository::{
    CategoryRepository, CommentRepository, InMemoryCategoryRepository, InMemoryCommentRepository,
    InMemoryLanguageRepository, InMemoryPostRepository, InMemoryUserRepository,
    InMemoryWordRepository, LanguageRepository, PostRepository, UserRepository, WordRepository,
};

/// Languages available out of the box; the migration seeds the same rows.
pub const DEFAULT_LANGUAGES: [(&str, &str); 5] = [
    ("en", "English"),
    ("fr", "French"),
    ("de", "German"),
    ("es", "Spanish"),
    ("ru", "Russian"),
];

#[derive(Clone)]
pub struct DatabaseClient {
    pub user_repo: Arc<dyn UserRepository>,
    pub post_repo: Arc<dyn PostRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub language_repo: Arc<dyn LanguageRepository>,
    pub word_repo: Arc<dyn WordRepository>,
}

impl DatabaseClient {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        match &config.database_url {
            Some(url) => {
                let database = PostgresDatabase::connect(url, config.db_connect_attempts).await?;
                database.migrate().await?;
                tracing::info!("Using PostgreSQL repositories");
                Ok(Self::postgres(&database))
            }
            None => {
                tracing::warn!("DATABASE_URL not set, using in-memory repositories");
                Self::in_memory().await
            }
        }
    }

    pub fn postgres(database: &PostgresDatabase) -> Self {
        Self {
            user_repo: Arc::new(database.user_repo()),
            post_repo: Arc::new(database.post_repo()),
            comment_repo: Arc::new(database.comment_repo()),
            category_repo: Arc::new(database.category_repo()),
            language_repo: Arc::new(database.language_repo()),
            word_repo: Arc::new(database.word_repo()),
        }
    }

    /// Fresh in-memory store seeded with the default languages.
    pub async fn in_memory() -> Result<Self> {
        let languages = Arc::new(InMemoryLanguageRepository::new());
        for (code, name) in DEFAULT_LANGUAGES {
            languages.create_language(code, name).await?;
        }
        let posts = Arc::new(InMemoryPostRepository::new());

        Ok(Self {
            user_repo: Arc::new(InMemoryUserRepository::new()),
            comment_repo: Arc::new(InMemoryCommentRepository::new(posts.clone())),
            post_repo: posts,
            category_repo: Arc::new(InMemoryCategoryRepository::new()),
            word_repo: Arc::new(InMemoryWordRepository::new(languages.clone())),
            language_repo: languages,
        })
    }

    pub async fn health_check(&self) -> Result<()> {
        self.language_repo.find_all().await.map(|_| ())
    }
}
