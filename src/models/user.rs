use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub language: String, // Preferred locale code, e.g. "en"
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated registration, ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub language: String,
}

/// Profile fields written back by the edit form. `password_hash` is only
/// replaced when a new password was supplied.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub language: String,
    pub password_hash: Option<String>,
}

impl User {
    pub fn apply(&mut self, changes: UserChanges) {
        self.username = changes.username;
        self.email = changes.email;
        self.language = changes.language;
        if let Some(hash) = changes.password_hash {
            self.password_hash = hash;
        }
        self.updated_at = Utc::now();
    }
}
