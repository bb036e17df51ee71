use std::sync::Arc;

use crate::db::repository::{LanguageRepository, WordRepository};
use crate::forms::FormErrors;
use crate::models::{Language, Word, WordInput, WordRef};
use crate::pagination::{Page, PageRequest, WORDS_PER_PAGE};
use crate::{AppError, Result};

pub struct WordService {
    word_repo: Arc<dyn WordRepository>,
    language_repo: Arc<dyn LanguageRepository>,
}

impl WordService {
    pub fn new(word_repo: Arc<dyn WordRepository>, language_repo: Arc<dyn LanguageRepository>) -> Self {
        Self {
            word_repo,
            language_repo,
        }
    }

    pub async fn list_page(&self, page: u32) -> Result<Page<Word>> {
        let request = PageRequest::new(page, WORDS_PER_PAGE)?;
        let total = self.word_repo.count_words().await?;
        let items = self
            .word_repo
            .get_words_paginated(request.limit(), request.offset())
            .await?;
        Ok(Page::new(items, request, total))
    }

    pub async fn find_word(&self, id: i64) -> Result<Word> {
        self.word_repo
            .get_word_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Word {}", id)))
    }

    pub async fn languages(&self) -> Result<Vec<Language>> {
        self.language_repo.find_all().await
    }

    /// Candidate translations for a word form, without the word itself.
    pub async fn translation_options(&self, exclude: Option<i64>) -> Result<Vec<WordRef>> {
        let mut refs = self.word_repo.find_all_refs().await?;
        refs.retain(|r| Some(r.id) != exclude);
        Ok(refs)
    }

    /// Checks that the referenced language and translations exist.
    pub async fn check_references(&self, input: &WordInput) -> Result<FormErrors> {
        let mut errors = FormErrors::new();

        if let Some(language_id) = input.language_id {
            if self.language_repo.find_by_id(language_id).await?.is_none() {
                errors.add("language_id", "Please choose a valid language");
            }
        }

        if !input.translation_ids.is_empty() {
            let found = self.word_repo.find_refs_by_ids(&input.translation_ids).await?;
            if found.len() != input.translation_ids.len() {
                errors.add("translations", "Some of the chosen translations do not exist");
            }
        }

        Ok(errors)
    }

    pub async fn create(&self, input: &WordInput) -> Result<Word> {
        let word = self.word_repo.create_word(input).await?;
        tracing::info!("Created word {} ({})", word.name, word.id);
        Ok(word)
    }

    pub async fn update(&self, id: i64, input: &WordInput) -> Result<Word> {
        let word = self.word_repo.update_word(id, input).await?;
        tracing::info!("Updated word {}", word.id);
        Ok(word)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        // 404 for unknown ids rather than a silent no-op
        self.find_word(id).await?;
        self.word_repo.delete_word(id).await?;
        tracing::info!("Deleted word {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DatabaseClient;

    async fn service() -> WordService {
        let db = DatabaseClient::in_memory().await.unwrap();
        WordService::new(db.word_repo, db.language_repo)
    }

    fn input(name: &str, language_id: Option<i64>, translations: &[i64]) -> WordInput {
        WordInput::normalized(name, language_id, translations)
    }

    #[tokio::test]
    async fn test_list_pages_of_five() {
        let service = service().await;
        for i in 1..=7 {
            service.create(&input(&format!("word{}", i), None, &[])).await.unwrap();
        }

        let first = service.list_page(1).await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.page_count(), 2);

        let second = service.list_page(2).await.unwrap();
        assert_eq!(second.items.len(), 2);

        assert!(service.list_page(3).await.unwrap().is_empty());
        assert!(matches!(service.list_page(0).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_references_are_checked() {
        let service = service().await;
        let dog = service.create(&input("dog", Some(1), &[])).await.unwrap();

        let ok = service.check_references(&input("chien", Some(2), &[dog.id])).await.unwrap();
        assert!(ok.is_empty());

        let bad = service
            .check_references(&input("chien", Some(99), &[dog.id, 404]))
            .await
            .unwrap();
        assert!(bad.has("language_id"));
        assert!(bad.has("translations"));
    }

    #[tokio::test]
    async fn test_translation_options_exclude_self() {
        let service = service().await;
        let dog = service.create(&input("dog", None, &[])).await.unwrap();
        service.create(&input("chien", None, &[dog.id])).await.unwrap();

        let options = service.translation_options(Some(dog.id)).await.unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "chien");
    }

    #[tokio::test]
    async fn test_delete_unknown_word_is_not_found() {
        let service = service().await;
        assert!(matches!(service.delete(12).await, Err(AppError::NotFound(_))));
    }
}
