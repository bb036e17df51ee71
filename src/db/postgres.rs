// PostgreSQL repository implementations using sqlx
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::db::repository::{
    CategoryRepository, CommentRepository, LanguageRepository, PostRepository, UserRepository,
    WordRepository,
};
use crate::models::{
    Category, Comment, Language, NewComment, NewPost, NewUser, Post, RecentComment, User, Word,
    WordInput, WordRef,
};
use crate::{AppError, Result};

// PostgreSQL connection pool wrapper
pub struct PostgresDatabase {
    pub pool: Arc<PgPool>,
}

const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(250);
const CONNECT_RETRY_MAX_DELAY: Duration = Duration::from_secs(8);

impl PostgresDatabase {
    /// Opens the pool, making up to `attempts` tries while the server is
    /// unreachable or still starting. Other failures (bad URL, bad
    /// credentials) are returned straight away.
    pub async fn connect(database_url: &str, attempts: u32) -> Result<Self> {
        let host = url_host(database_url);
        let attempts = attempts.max(1);
        let mut delay = CONNECT_RETRY_DELAY;
        let mut attempt = 1;

        loop {
            let connected = PgPoolOptions::new()
                .max_connections(20)
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(3600))
                .acquire_timeout(Duration::from_secs(30))
                .connect(database_url)
                .await;

            match connected {
                Ok(pool) => {
                    tracing::info!("Connected to PostgreSQL at {} (attempt {}/{})", host, attempt, attempts);
                    return Ok(Self {
                        pool: Arc::new(pool),
                    });
                }
                Err(e) if attempt < attempts && is_transient(&e) => {
                    tracing::warn!(
                        "PostgreSQL at {} not reachable (attempt {}/{}): {}. Retrying in {}ms",
                        host,
                        attempt,
                        attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(CONNECT_RETRY_MAX_DELAY);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Giving up on PostgreSQL at {} after {} attempt(s): {}", host, attempt, e);
                    return Err(AppError::DatabaseError(format!(
                        "Failed to connect to PostgreSQL at {}: {}",
                        host, e
                    )));
                }
            }
        }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn user_repo(&self) -> PostgresUserRepository {
        PostgresUserRepository { pool: self.pool.clone() }
    }

    pub fn post_repo(&self) -> PostgresPostRepository {
        PostgresPostRepository { pool: self.pool.clone() }
    }

    pub fn comment_repo(&self) -> PostgresCommentRepository {
        PostgresCommentRepository { pool: self.pool.clone() }
    }

    pub fn category_repo(&self) -> PostgresCategoryRepository {
        PostgresCategoryRepository { pool: self.pool.clone() }
    }

    pub fn language_repo(&self) -> PostgresLanguageRepository {
        PostgresLanguageRepository { pool: self.pool.clone() }
    }

    pub fn word_repo(&self) -> PostgresWordRepository {
        PostgresWordRepository { pool: self.pool.clone() }
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, language, created_at, updated_at";
const POST_COLUMNS: &str = "id, title, content, author_id, category_id, is_approved, created_at";

const UNIQUE_VIOLATION: &str = "23505";
const CANNOT_CONNECT_NOW: &str = "57P03";

/// Failures worth another connection attempt: network trouble, pool
/// timeouts, or a server that is still starting up.
fn is_transient(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db) => db.code().as_deref() == Some(CANNOT_CONNECT_NOW),
        _ => false,
    }
}

/// `host[:port]` of a connection URL, without credentials or database name.
fn url_host(database_url: &str) -> &str {
    let Some((_, rest)) = database_url.split_once("://") else {
        return "<unparsed url>";
    };
    let authority = rest.split(['/', '?']).next().unwrap_or(rest);
    match authority.rsplit_once('@') {
        Some((_, host)) => host,
        None => authority,
    }
}

/// Unique violations on `users` become `AppError::Conflict` naming the
/// column, so a lost race against another signup still reaches the form.
fn user_write_error(e: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let field = match db.constraint() {
                Some(constraint) if constraint.contains("email") => "email",
                _ => "username",
            };
            return AppError::Conflict(field.to_string());
        }
    }
    AppError::DatabaseError(format!("Failed to {} user: {}", action, e))
}

// PostgreSQL User Repository
pub struct PostgresUserRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, language)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.language)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| user_write_error(e, "create"))
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user by id: {}", e)))
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get user by username: {}", e)))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get user by email: {}", e)))
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET username = $2, email = $3, password_hash = $4, language = $5, updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.language)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| user_write_error(e, "update"))?
        .ok_or_else(|| AppError::not_found("User"))
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let pattern = format!("%{}%", escape_like(query));
        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users
             WHERE username ILIKE $1 OR email ILIKE $1
             ORDER BY username",
            USER_COLUMNS
        ))
        .bind(pattern)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to search users: {}", e)))
    }
}

// PostgreSQL Post Repository
pub struct PostgresPostRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (title, content, author_id, category_id, is_approved)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            POST_COLUMNS
        ))
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.author_id)
        .bind(post.category_id)
        .bind(post.is_approved)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create post: {}", e)))
    }

    async fn find_approved_user_posts(&self, author_id: i64) -> Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts
             WHERE author_id = $1 AND is_approved
             ORDER BY created_at DESC, id DESC",
            POST_COLUMNS
        ))
        .bind(author_id)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get approved posts: {}", e)))
    }

    async fn find_user_posts(&self, author_id: i64, limit: u32, offset: u64) -> Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {} FROM posts
             WHERE author_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3",
            POST_COLUMNS
        ))
        .bind(author_id)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get user posts: {}", e)))
    }

    async fn count_user_posts(&self, author_id: i64) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count user posts: {}", e)))?;
        Ok(count.max(0) as u64)
    }
}

// PostgreSQL Comment Repository
pub struct PostgresCommentRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        sqlx::query_as::<_, Comment>(
            "INSERT INTO comments (post_id, author_id, content)
             VALUES ($1, $2, $3)
             RETURNING id, post_id, author_id, content, created_at",
        )
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.content)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create comment: {}", e)))
    }

    async fn find_latest_by_author(&self, author_id: i64, limit: u32) -> Result<Vec<RecentComment>> {
        sqlx::query_as::<_, RecentComment>(
            "SELECT c.id, c.post_id, p.title AS post_title, c.content, c.created_at
             FROM comments c
             JOIN posts p ON p.id = c.post_id
             WHERE c.author_id = $1
             ORDER BY c.id DESC
             LIMIT $2",
        )
        .bind(author_id)
        .bind(limit as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to get latest comments: {}", e)))
    }
}

// PostgreSQL Category Repository
pub struct PostgresCategoryRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create_category(&self, name: &str) -> Result<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create category: {}", e)))
    }

    async fn find_all(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list categories: {}", e)))
    }
}

// PostgreSQL Language Repository
pub struct PostgresLanguageRepository {
    pool: Arc<PgPool>,
}

#[async_trait]
impl LanguageRepository for PostgresLanguageRepository {
    async fn create_language(&self, code: &str, name: &str) -> Result<Language> {
        sqlx::query_as::<_, Language>(
            "INSERT INTO languages (code, name) VALUES ($1, $2) RETURNING id, code, name",
        )
        .bind(code)
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create language: {}", e)))
    }

    async fn find_all(&self) -> Result<Vec<Language>> {
        sqlx::query_as::<_, Language>("SELECT id, code, name FROM languages ORDER BY name")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list languages: {}", e)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Language>> {
        sqlx::query_as::<_, Language>("SELECT id, code, name FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get language: {}", e)))
    }
}

// PostgreSQL Word Repository
pub struct PostgresWordRepository {
    pool: Arc<PgPool>,
}

#[derive(sqlx::FromRow)]
struct WordRow {
    id: i64,
    name: String,
    language_id: Option<i64>,
    language_code: Option<String>,
    language_name: Option<String>,
}

#[derive(sqlx::FromRow)]
struct TranslationRow {
    word_id: i64,
    id: i64,
    name: String,
}

const WORD_SELECT: &str = "SELECT w.id, w.name, w.language_id,
                                  l.code AS language_code, l.name AS language_name
                           FROM words w
                           LEFT JOIN languages l ON l.id = w.language_id";

impl PostgresWordRepository {
    // Loads the translations of every row in one query and stitches them on
    async fn assemble(&self, rows: Vec<WordRow>) -> Result<Vec<Word>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let translations = sqlx::query_as::<_, TranslationRow>(
            "SELECT wt.word_id, t.id, t.name
             FROM word_translations wt
             JOIN words t ON t.id = wt.translation_id
             WHERE wt.word_id = ANY($1)
             ORDER BY wt.word_id, t.name",
        )
        .bind(&ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to load translations: {}", e)))?;

        let mut by_word: HashMap<i64, Vec<WordRef>> = HashMap::new();
        for t in translations {
            by_word
                .entry(t.word_id)
                .or_default()
                .push(WordRef { id: t.id, name: t.name });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let mut word = Word::new(row.id, row.name);
                let language = match (row.language_id, row.language_code, row.language_name) {
                    (Some(id), Some(code), Some(name)) => Some(Language { id, code, name }),
                    _ => None,
                };
                word.set_language(language);
                for translation in by_word.remove(&row.id).unwrap_or_default() {
                    word.add_translation(translation);
                }
                word
            })
            .collect())
    }

    async fn write_translations(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        word_id: i64,
        translation_ids: &[i64],
    ) -> Result<()> {
        sqlx::query("DELETE FROM word_translations WHERE word_id = $1")
            .bind(word_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to clear translations: {}", e)))?;

        for translation_id in translation_ids.iter().filter(|tid| **tid != word_id) {
            sqlx::query(
                "INSERT INTO word_translations (word_id, translation_id)
                 VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(word_id)
            .bind(translation_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to link translation: {}", e)))?;
        }
        Ok(())
    }

    async fn load(&self, id: i64) -> Result<Option<Word>> {
        let row = sqlx::query_as::<_, WordRow>(&format!("{} WHERE w.id = $1", WORD_SELECT))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get word: {}", e)))?;

        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl WordRepository for PostgresWordRepository {
    async fn create_word(&self, input: &WordInput) -> Result<Word> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let id: i64 = sqlx::query_scalar("INSERT INTO words (name, language_id) VALUES ($1, $2) RETURNING id")
            .bind(&input.name)
            .bind(input.language_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create word: {}", e)))?;

        Self::write_translations(&mut tx, id, &input.translation_ids).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit word: {}", e)))?;

        self.load(id)
            .await?
            .ok_or_else(|| AppError::InternalError(format!("Word {} vanished after insert", id)))
    }

    async fn get_word_by_id(&self, id: i64) -> Result<Option<Word>> {
        self.load(id).await
    }

    async fn get_words_paginated(&self, limit: u32, offset: u64) -> Result<Vec<Word>> {
        let rows = sqlx::query_as::<_, WordRow>(&format!(
            "{} ORDER BY w.id LIMIT $1 OFFSET $2",
            WORD_SELECT
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list words: {}", e)))?;

        self.assemble(rows).await
    }

    async fn count_words(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count words: {}", e)))?;
        Ok(count.max(0) as u64)
    }

    async fn update_word(&self, id: i64, input: &WordInput) -> Result<Word> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let result = sqlx::query("UPDATE words SET name = $2, language_id = $3 WHERE id = $1")
            .bind(id)
            .bind(&input.name)
            .bind(input.language_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update word: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Word"));
        }

        Self::write_translations(&mut tx, id, &input.translation_ids).await?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit word: {}", e)))?;

        self.load(id).await?.ok_or_else(|| AppError::not_found("Word"))
    }

    async fn delete_word(&self, id: i64) -> Result<()> {
        // Translation links in both directions go with it (ON DELETE CASCADE)
        sqlx::query("DELETE FROM words WHERE id = $1")
            .bind(id)
            .execute(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete word: {}", e)))?;
        Ok(())
    }

    async fn find_refs_by_ids(&self, ids: &[i64]) -> Result<Vec<WordRef>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        sqlx::query_as::<_, WordRef>("SELECT id, name FROM words WHERE id = ANY($1) ORDER BY id")
            .bind(ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to get words: {}", e)))
    }

    async fn find_all_refs(&self) -> Result<Vec<WordRef>> {
        sqlx::query_as::<_, WordRef>("SELECT id, name FROM words ORDER BY LOWER(name), id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list words: {}", e)))
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
