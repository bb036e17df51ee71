// Binds submitted forms to entities, validates and persists them
use std::sync::Arc;

use crate::forms::{
    validate_form, DeleteForm, EditUserForm, FormErrors, FormOutcome, FormState, RegisterUserForm,
    SearchUserForm, WordForm,
};
use crate::models::{User, Word};
use crate::services::{UserService, WordService};
use crate::{AppError, Result};

const USERNAME_TAKEN: &str = "This username is already taken";
const EMAIL_TAKEN: &str = "An account with this email already exists";

/// Search form plus, when it validated, the matching users.
pub struct SearchResult {
    pub form: FormState<SearchUserForm>,
    pub users: Option<Vec<User>>,
}

/// Every method takes `None` for a plain GET and `Some(form)` for a
/// submission. Validation problems come back as `FormOutcome::Render`;
/// only storage failures are errors.
pub struct FormManager {
    user_service: Arc<UserService>,
    word_service: Arc<WordService>,
    supported_locales: Vec<String>,
}

impl FormManager {
    pub fn new(
        user_service: Arc<UserService>,
        word_service: Arc<WordService>,
        supported_locales: Vec<String>,
    ) -> Self {
        Self {
            user_service,
            word_service,
            supported_locales,
        }
    }

    pub async fn registration(
        &self,
        submission: Option<RegisterUserForm>,
        default_language: &str,
    ) -> Result<FormOutcome<RegisterUserForm, User>> {
        let Some(mut form) = submission else {
            let blank = RegisterUserForm {
                language: default_language.to_string(),
                ..RegisterUserForm::default()
            };
            return Ok(FormOutcome::Render(FormState::fresh(blank)));
        };

        form.normalize();
        let mut errors = form.check(&self.supported_locales);
        if !errors.has("username") && self.user_service.username_taken(&form.username, None).await? {
            errors.add("username", USERNAME_TAKEN);
        }
        if !errors.has("email") && self.user_service.email_taken(&form.email, None).await? {
            errors.add("email", EMAIL_TAKEN);
        }

        if !errors.is_empty() {
            return Ok(FormOutcome::Render(FormState::bound(
                without_passwords(form),
                errors,
            )));
        }

        let registered = self
            .user_service
            .register(&form.username, &form.email, &form.password, &form.language)
            .await;
        match registered {
            Ok(user) => Ok(FormOutcome::Success(user)),
            Err(AppError::Conflict(field)) => Ok(FormOutcome::Render(FormState::bound(
                without_passwords(form),
                conflict_errors(&field),
            ))),
            Err(e) => Err(e),
        }
    }

    /// On success yields the URL to redirect to.
    pub async fn edit_user(
        &self,
        user: User,
        submission: Option<EditUserForm>,
    ) -> Result<FormOutcome<EditUserForm, String>> {
        let Some(mut form) = submission else {
            return Ok(FormOutcome::Render(FormState::fresh(EditUserForm::from_user(&user))));
        };

        form.normalize();
        let mut errors = form.check(&self.supported_locales);
        if !errors.has("username")
            && self
                .user_service
                .username_taken(&form.username, Some(user.id))
                .await?
        {
            errors.add("username", USERNAME_TAKEN);
        }
        if !errors.has("email") && self.user_service.email_taken(&form.email, Some(user.id)).await? {
            errors.add("email", EMAIL_TAKEN);
        }
        if form.wants_password_change()
            && !errors.has("current_password")
            && !self.user_service.check_password(&user, &form.current_password)?
        {
            errors.add("current_password", "Current password is incorrect");
        }

        if !errors.is_empty() {
            return Ok(FormOutcome::Render(FormState::bound(
                form.without_passwords(),
                errors,
            )));
        }

        let new_password = form.wants_password_change().then_some(form.new_password.as_str());
        let updated = self
            .user_service
            .update_profile(user, &form.username, &form.email, &form.language, new_password)
            .await;
        match updated {
            Ok(user) => Ok(FormOutcome::Success(format!("/user/{}", user.id))),
            Err(AppError::Conflict(field)) => Ok(FormOutcome::Render(FormState::bound(
                form.without_passwords(),
                conflict_errors(&field),
            ))),
            Err(e) => Err(e),
        }
    }

    pub async fn search_users(&self, submission: Option<SearchUserForm>) -> Result<SearchResult> {
        let Some(mut form) = submission else {
            return Ok(SearchResult {
                form: FormState::fresh(SearchUserForm::default()),
                users: None,
            });
        };

        form.normalize();
        let errors = validate_form(&form);
        if !errors.is_empty() {
            return Ok(SearchResult {
                form: FormState::bound(form, errors),
                users: None,
            });
        }

        let users = self.user_service.search(&form.query).await?;
        Ok(SearchResult {
            form: FormState::bound(form, FormErrors::new()),
            users: Some(users),
        })
    }

    /// Create (`existing` is `None`) or edit a word.
    pub async fn word(
        &self,
        existing: Option<&Word>,
        submission: Option<WordForm>,
    ) -> Result<FormOutcome<WordForm, Word>> {
        let Some(form) = submission else {
            let data = existing.map(WordForm::from_word).unwrap_or_default();
            return Ok(FormOutcome::Render(FormState::fresh(data)));
        };

        let self_id = existing.map(|word| word.id);
        let input = match form.parse(self_id) {
            Ok(input) => input,
            Err(errors) => return Ok(FormOutcome::Render(FormState::bound(form, errors))),
        };

        let errors = self.word_service.check_references(&input).await?;
        if !errors.is_empty() {
            return Ok(FormOutcome::Render(FormState::bound(form, errors)));
        }

        let word = match self_id {
            Some(id) => self.word_service.update(id, &input).await?,
            None => self.word_service.create(&input).await?,
        };
        Ok(FormOutcome::Success(word))
    }

    /// Returns whether the word was deleted; a form without the DELETE
    /// override deletes nothing.
    pub async fn delete_word(&self, word_id: i64, form: &DeleteForm) -> Result<bool> {
        if !form.is_delete() {
            tracing::debug!("Delete form for word {} submitted without DELETE", word_id);
            return Ok(false);
        }
        self.word_service.delete(word_id).await?;
        Ok(true)
    }
}

/// Field error for a uniqueness conflict the repository caught after the
/// form's own lookups passed.
fn conflict_errors(field: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    match field {
        "email" => errors.add("email", EMAIL_TAKEN),
        _ => errors.add("username", USERNAME_TAKEN),
    }
    errors
}

fn without_passwords(mut form: RegisterUserForm) -> RegisterUserForm {
    form.password.clear();
    form.password_confirmation.clear();
    form
}
