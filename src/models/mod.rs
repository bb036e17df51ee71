pub mod user;
pub mod post;
pub mod comment;
pub mod category;
pub mod language;
pub mod word;

// Re-export models for convenience
pub use user::{NewUser, User, UserChanges};
pub use post::{NewPost, Post};
pub use comment::{Comment, NewComment, RecentComment};
pub use category::Category;
pub use language::Language;
pub use word::{Word, WordInput, WordRef};
