// Library modules for the wordbook application
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod locale;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod views;

use std::sync::Arc;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, Result};

// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: db::DatabaseClient,
    pub auth_service: Arc<auth::AuthService>,
    pub user_service: Arc<services::UserService>,
    pub post_service: Arc<services::PostService>,
    pub comment_service: Arc<services::CommentService>,
    pub word_service: Arc<services::WordService>,
    pub form_manager: Arc<services::FormManager>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let db = db::DatabaseClient::new(&config).await?;
        Ok(Self::with_database(config, db))
    }

    /// Wires the services on top of an already connected store.
    pub fn with_database(config: AppConfig, db: db::DatabaseClient) -> Self {
        let auth_service = Arc::new(auth::AuthService::new(
            &config.jwt_secret,
            config.session_ttl_hours,
        ));
        let user_service = Arc::new(services::UserService::new(
            db.user_repo.clone(),
            auth_service.clone(),
        ));
        let post_service = Arc::new(services::PostService::new(
            db.post_repo.clone(),
            db.category_repo.clone(),
        ));
        let comment_service = Arc::new(services::CommentService::new(db.comment_repo.clone()));
        let word_service = Arc::new(services::WordService::new(
            db.word_repo.clone(),
            db.language_repo.clone(),
        ));
        let form_manager = Arc::new(services::FormManager::new(
            user_service.clone(),
            word_service.clone(),
            config.supported_locales.clone(),
        ));

        Self {
            config,
            db,
            auth_service,
            user_service,
            post_service,
            comment_service,
            word_service,
            form_manager,
        }
    }
}
