// Repository trait abstractions for database operations
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{
    Category, Comment, Language, NewComment, NewPost, NewUser, Post, RecentComment, User, Word,
    WordInput, WordRef,
};
use crate::{AppError, Result};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &NewUser) -> Result<User>;
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update_user(&self, user: &User) -> Result<User>;
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn create_post(&self, post: &NewPost) -> Result<Post>;
    async fn find_approved_user_posts(&self, author_id: i64) -> Result<Vec<Post>>;
    async fn find_user_posts(&self, author_id: i64, limit: u32, offset: u64) -> Result<Vec<Post>>;
    async fn count_user_posts(&self, author_id: i64) -> Result<u64>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment>;
    /// The author's comments with the highest ids, highest first.
    async fn find_latest_by_author(&self, author_id: i64, limit: u32) -> Result<Vec<RecentComment>>;
}

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create_category(&self, name: &str) -> Result<Category>;
    async fn find_all(&self) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait LanguageRepository: Send + Sync {
    async fn create_language(&self, code: &str, name: &str) -> Result<Language>;
    async fn find_all(&self) -> Result<Vec<Language>>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Language>>;
}

#[async_trait]
pub trait WordRepository: Send + Sync {
    async fn create_word(&self, input: &WordInput) -> Result<Word>;
    async fn get_word_by_id(&self, id: i64) -> Result<Option<Word>>;
    async fn get_words_paginated(&self, limit: u32, offset: u64) -> Result<Vec<Word>>;
    async fn count_words(&self) -> Result<u64>;
    async fn update_word(&self, id: i64, input: &WordInput) -> Result<Word>;
    /// Removes the word and every translation link pointing to or from it.
    async fn delete_word(&self, id: i64) -> Result<()>;
    async fn find_refs_by_ids(&self, ids: &[i64]) -> Result<Vec<WordRef>>;
    async fn find_all_refs(&self) -> Result<Vec<WordRef>>;
}

// In-memory implementations for development and tests (no DATABASE_URL)

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|_| AppError::InternalError("In-memory store lock poisoned".to_string()))
}

/// Rows keyed by an auto-incremented id.
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T> Table<T> {
    fn insert_with(&mut self, build: impl FnOnce(i64) -> T) -> &T {
        let id = self.next_id;
        self.next_id += 1;
        self.rows.entry(id).or_insert_with(|| build(id))
    }
}

/// Mirrors the UNIQUE constraints on `users.username` and `users.email`.
fn check_unique(users: &Table<User>, except_id: Option<i64>, username: &str, email: &str) -> Result<()> {
    for other in users.rows.values().filter(|u| Some(u.id) != except_id) {
        if other.username == username {
            return Err(AppError::Conflict("username".to_string()));
        }
        if other.email == email {
            return Err(AppError::Conflict("email".to_string()));
        }
    }
    Ok(())
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Table<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &NewUser) -> Result<User> {
        let mut users = lock(&self.users)?;

        check_unique(&users, None, &user.username, &user.email)?;

        let now = Utc::now();
        let created = users.insert_with(|id| User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            language: user.language.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(created.clone())
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(lock(&self.users)?.rows.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = lock(&self.users)?;
        Ok(users.rows.values().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = lock(&self.users)?;
        Ok(users.rows.values().find(|u| u.email == email).cloned())
    }

    async fn update_user(&self, user: &User) -> Result<User> {
        let mut users = lock(&self.users)?;
        check_unique(&users, Some(user.id), &user.username, &user.email)?;
        let slot = users
            .rows
            .get_mut(&user.id)
            .ok_or_else(|| AppError::not_found("User"))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        let needle = query.to_lowercase();
        let users = lock(&self.users)?;
        let mut found: Vec<User> = users
            .rows
            .values()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle) || u.email.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(found)
    }
}

#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: Mutex<Table<Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn posts_by(&self, author_id: i64, approved_only: bool) -> Result<Vec<Post>> {
        let posts = lock(&self.posts)?;
        let mut found: Vec<Post> = posts
            .rows
            .values()
            .filter(|p| p.author_id == author_id && (!approved_only || p.is_approved))
            .cloned()
            .collect();
        // Newest first
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(found)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let mut posts = lock(&self.posts)?;
        let created = posts.insert_with(|id| Post {
            id,
            title: post.title.clone(),
            content: post.content.clone(),
            author_id: post.author_id,
            category_id: post.category_id,
            is_approved: post.is_approved,
            created_at: Utc::now(),
        });
        Ok(created.clone())
    }

    async fn find_approved_user_posts(&self, author_id: i64) -> Result<Vec<Post>> {
        self.posts_by(author_id, true)
    }

    async fn find_user_posts(&self, author_id: i64, limit: u32, offset: u64) -> Result<Vec<Post>> {
        Ok(self
            .posts_by(author_id, false)?
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_user_posts(&self, author_id: i64) -> Result<u64> {
        Ok(self.posts_by(author_id, false)?.len() as u64)
    }
}

pub struct InMemoryCommentRepository {
    comments: Mutex<Table<Comment>>,
    posts: Arc<InMemoryPostRepository>,
}

impl InMemoryCommentRepository {
    pub fn new(posts: Arc<InMemoryPostRepository>) -> Self {
        Self {
            comments: Mutex::new(Table::default()),
            posts,
        }
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment> {
        if !lock(&self.posts.posts)?.rows.contains_key(&comment.post_id) {
            return Err(AppError::not_found("Post"));
        }
        let mut comments = lock(&self.comments)?;
        let created = comments.insert_with(|id| Comment {
            id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            content: comment.content.clone(),
            created_at: Utc::now(),
        });
        Ok(created.clone())
    }

    async fn find_latest_by_author(&self, author_id: i64, limit: u32) -> Result<Vec<RecentComment>> {
        let posts = lock(&self.posts.posts)?;
        let comments = lock(&self.comments)?;
        Ok(comments
            .rows
            .values()
            .rev()
            .filter(|c| c.author_id == author_id)
            .take(limit as usize)
            .map(|c| RecentComment {
                id: c.id,
                post_id: c.post_id,
                post_title: posts
                    .rows
                    .get(&c.post_id)
                    .map(|p| p.title.clone())
                    .unwrap_or_default(),
                content: c.content.clone(),
                created_at: c.created_at,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: Mutex<Table<Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn create_category(&self, name: &str) -> Result<Category> {
        let mut categories = lock(&self.categories)?;
        let created = categories.insert_with(|id| Category {
            id,
            name: name.to_string(),
        });
        Ok(created.clone())
    }

    async fn find_all(&self) -> Result<Vec<Category>> {
        let mut all: Vec<Category> = lock(&self.categories)?.rows.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[derive(Default)]
pub struct InMemoryLanguageRepository {
    languages: Mutex<Table<Language>>,
}

impl InMemoryLanguageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> Result<BTreeMap<i64, Language>> {
        Ok(lock(&self.languages)?.rows.clone())
    }
}

#[async_trait]
impl LanguageRepository for InMemoryLanguageRepository {
    async fn create_language(&self, code: &str, name: &str) -> Result<Language> {
        let mut languages = lock(&self.languages)?;
        if languages.rows.values().any(|l| l.code == code) {
            return Err(AppError::DatabaseError(format!(
                "Failed to create language: duplicate code {}",
                code
            )));
        }
        let created = languages.insert_with(|id| Language {
            id,
            code: code.to_string(),
            name: name.to_string(),
        });
        Ok(created.clone())
    }

    async fn find_all(&self) -> Result<Vec<Language>> {
        let mut all: Vec<Language> = self.snapshot()?.into_values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Language>> {
        Ok(lock(&self.languages)?.rows.get(&id).cloned())
    }
}

#[derive(Debug, Clone)]
struct WordRecord {
    name: String,
    language_id: Option<i64>,
    translation_ids: Vec<i64>,
}

pub struct InMemoryWordRepository {
    words: Mutex<Table<WordRecord>>,
    languages: Arc<InMemoryLanguageRepository>,
}

impl InMemoryWordRepository {
    pub fn new(languages: Arc<InMemoryLanguageRepository>) -> Self {
        Self {
            words: Mutex::new(Table::default()),
            languages,
        }
    }

    fn assemble(
        id: i64,
        record: &WordRecord,
        rows: &BTreeMap<i64, WordRecord>,
        languages: &BTreeMap<i64, Language>,
    ) -> Word {
        let mut word = Word::new(id, record.name.clone());
        word.set_language(record.language_id.and_then(|lid| languages.get(&lid).cloned()));
        for tid in &record.translation_ids {
            if let Some(target) = rows.get(tid) {
                word.add_translation(WordRef {
                    id: *tid,
                    name: target.name.clone(),
                });
            }
        }
        word
    }

    fn record_from(input: &WordInput) -> WordRecord {
        WordRecord {
            name: input.name.clone(),
            language_id: input.language_id,
            translation_ids: input.translation_ids.clone(),
        }
    }
}

#[async_trait]
impl WordRepository for InMemoryWordRepository {
    async fn create_word(&self, input: &WordInput) -> Result<Word> {
        let languages = self.languages.snapshot()?;
        let mut words = lock(&self.words)?;
        let id = words.next_id;
        words.insert_with(|_| Self::record_from(input));
        let record = &words.rows[&id];
        Ok(Self::assemble(id, record, &words.rows, &languages))
    }

    async fn get_word_by_id(&self, id: i64) -> Result<Option<Word>> {
        let languages = self.languages.snapshot()?;
        let words = lock(&self.words)?;
        Ok(words
            .rows
            .get(&id)
            .map(|record| Self::assemble(id, record, &words.rows, &languages)))
    }

    async fn get_words_paginated(&self, limit: u32, offset: u64) -> Result<Vec<Word>> {
        let languages = self.languages.snapshot()?;
        let words = lock(&self.words)?;
        Ok(words
            .rows
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(id, record)| Self::assemble(*id, record, &words.rows, &languages))
            .collect())
    }

    async fn count_words(&self) -> Result<u64> {
        Ok(lock(&self.words)?.rows.len() as u64)
    }

    async fn update_word(&self, id: i64, input: &WordInput) -> Result<Word> {
        let languages = self.languages.snapshot()?;
        let mut words = lock(&self.words)?;
        let slot = words
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Word"))?;
        *slot = Self::record_from(input);
        let record = &words.rows[&id];
        Ok(Self::assemble(id, record, &words.rows, &languages))
    }

    async fn delete_word(&self, id: i64) -> Result<()> {
        let mut words = lock(&self.words)?;
        words.rows.remove(&id);
        for record in words.rows.values_mut() {
            record.translation_ids.retain(|tid| *tid != id);
        }
        Ok(())
    }

    async fn find_refs_by_ids(&self, ids: &[i64]) -> Result<Vec<WordRef>> {
        let words = lock(&self.words)?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                words.rows.get(id).map(|record| WordRef {
                    id: *id,
                    name: record.name.clone(),
                })
            })
            .collect())
    }

    async fn find_all_refs(&self) -> Result<Vec<WordRef>> {
        let words = lock(&self.words)?;
        let mut refs: Vec<WordRef> = words
            .rows
            .iter()
            .map(|(id, record)| WordRef {
                id: *id,
                name: record.name.clone(),
            })
            .collect();
        refs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.id.cmp(&b.id)));
        Ok(refs)
    }
}
