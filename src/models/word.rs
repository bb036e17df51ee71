use serde::{Deserialize, Serialize};

use super::Language;

/// Lightweight handle to another word, used for the translations set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct WordRef {
    pub id: i64,
    pub name: String,
}

/// Dictionary entry with an optional language and a self-referential,
/// unidirectional many-to-many set of translations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub name: String,
    pub language: Option<Language>,
    translations: Vec<WordRef>,
}

/// Validated word payload handed to the repository on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordInput {
    pub name: String,
    pub language_id: Option<i64>,
    pub translation_ids: Vec<i64>,
}

impl Word {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            language: None,
            translations: Vec::new(),
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_language(&mut self, language: Option<Language>) -> &mut Self {
        self.language = language;
        self
    }

    /// Adds a translation. A word never translates itself and each
    /// translation appears at most once.
    pub fn add_translation(&mut self, translation: WordRef) -> &mut Self {
        if translation.id != self.id && !self.translations.iter().any(|t| t.id == translation.id) {
            self.translations.push(translation);
        }
        self
    }

    pub fn remove_translation(&mut self, translation_id: i64) -> bool {
        let before = self.translations.len();
        self.translations.retain(|t| t.id != translation_id);
        before != self.translations.len()
    }

    pub fn translations(&self) -> &[WordRef] {
        &self.translations
    }

    pub fn translation_ids(&self) -> Vec<i64> {
        self.translations.iter().map(|t| t.id).collect()
    }
}

impl WordInput {
    /// Trims the name and collapses duplicate translation ids, keeping the
    /// first-seen order.
    pub fn normalized(name: &str, language_id: Option<i64>, translation_ids: &[i64]) -> Self {
        let mut ids: Vec<i64> = Vec::with_capacity(translation_ids.len());
        for id in translation_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        Self {
            name: name.trim().to_string(),
            language_id,
            translation_ids: ids,
        }
    }
}
