pub mod user_service;
pub mod post_service;
pub mod comment_service;
pub mod word_service;
pub mod form_manager;

// Re-export services for convenience
pub use user_service::UserService;
pub use post_service::PostService;
pub use comment_service::CommentService;
pub use word_service::WordService;
pub use form_manager::{FormManager, SearchResult};
