use serde::Deserialize;

use super::FormErrors;
use crate::models::{Word, WordInput};

pub const MAX_WORD_LENGTH: usize = 255;

/// Word form as submitted. The translations field is a multi-select, so
/// the form is bound from raw key/value pairs rather than a flat struct.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordForm {
    pub name: String,
    pub language_id: String,
    pub translations: Vec<String>,
}

impl WordForm {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = WordForm::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => form.name = value,
                "language_id" => form.language_id = value,
                "translations" | "translations[]" => {
                    if !value.trim().is_empty() {
                        form.translations.push(value)
                    }
                }
                _ => {}
            }
        }
        form
    }

    pub fn from_word(word: &Word) -> Self {
        Self {
            name: word.name.clone(),
            language_id: word
                .language
                .as_ref()
                .map(|l| l.id.to_string())
                .unwrap_or_default(),
            translations: word.translation_ids().iter().map(|id| id.to_string()).collect(),
        }
    }

    /// Parses and checks the fields; `self_id` is the id of the word being
    /// edited, which may not translate itself.
    pub fn parse(&self, self_id: Option<i64>) -> Result<WordInput, FormErrors> {
        let mut errors = FormErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name must not be blank");
        } else if name.chars().count() > MAX_WORD_LENGTH {
            errors.add("name", "Name cannot exceed 255 characters");
        }

        let language_id = match self.language_id.trim() {
            "" => None,
            raw => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("language_id", "Please choose a valid language");
                    None
                }
            },
        };

        let mut translation_ids = Vec::with_capacity(self.translations.len());
        for raw in &self.translations {
            match raw.trim().parse::<i64>() {
                Ok(id) if Some(id) == self_id => {
                    errors.add("translations", "A word cannot be its own translation");
                }
                Ok(id) => translation_ids.push(id),
                Err(_) => errors.add("translations", "Please choose valid translations"),
            }
        }

        if errors.is_empty() {
            Ok(WordInput::normalized(name, language_id, &translation_ids))
        } else {
            Err(errors)
        }
    }
}

/// The method-override form rendered next to a word.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeleteForm {
    #[serde(rename = "_method")]
    pub method: String,
}

impl DeleteForm {
    pub fn is_delete(&self) -> bool {
        self.method.eq_ignore_ascii_case("DELETE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_pairs_collects_multi_select() {
        let form = WordForm::from_pairs(pairs(&[
            ("name", "chien"),
            ("language_id", "2"),
            ("translations", "4"),
            ("translations[]", "7"),
            ("translations", ""),
            ("unrelated", "x"),
        ]));

        assert_eq!(form.name, "chien");
        assert_eq!(form.language_id, "2");
        assert_eq!(form.translations, vec!["4", "7"]);
    }

    #[test]
    fn test_parse_valid() {
        let form = WordForm::from_pairs(pairs(&[
            ("name", "  dog "),
            ("translations", "3"),
            ("translations", "3"),
        ]));
        let input = form.parse(None).unwrap();

        assert_eq!(input.name, "dog");
        assert_eq!(input.language_id, None);
        assert_eq!(input.translation_ids, vec![3]);
    }

    #[test]
    fn test_parse_rejects_blank_name_and_self_translation() {
        let form = WordForm::from_pairs(pairs(&[
            ("name", "   "),
            ("language_id", "abc"),
            ("translations", "9"),
        ]));
        let errors = form.parse(Some(9)).unwrap_err();

        assert!(errors.has("name"));
        assert!(errors.has("language_id"));
        assert_eq!(
            errors.get("translations"),
            ["A word cannot be its own translation".to_string()]
        );
    }

    #[test]
    fn test_parse_rejects_overlong_name() {
        let form = WordForm {
            name: "x".repeat(MAX_WORD_LENGTH + 1),
            ..WordForm::default()
        };
        assert!(form.parse(None).unwrap_err().has("name"));
    }

    #[test]
    fn test_delete_form_method() {
        assert!(DeleteForm {
            method: "delete".to_string()
        }
        .is_delete());
        assert!(!DeleteForm::default().is_delete());
    }
}
