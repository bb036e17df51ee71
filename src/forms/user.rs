use serde::Deserialize;
use validator::Validate;

use super::{validate_form, FormErrors};
use crate::models::User;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 4096;

#[derive(Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterUserForm {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub password_confirmation: String,
    pub language: String,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct EditUserForm {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    pub language: String,
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SearchUserForm {
    #[validate(length(min = 2, max = 50, message = "Search term must be between 2 and 50 characters"))]
    pub query: String,
}

fn check_password_cap(field: &str, password: &str, errors: &mut FormErrors) {
    if password.chars().count() > MAX_PASSWORD_LENGTH {
        errors.add(field, "Password must be at most 4096 characters");
    }
}

fn check_username(username: &str, errors: &mut FormErrors) {
    let allowed = |c: char| c.is_alphanumeric() || "._-".contains(c);
    if !username.chars().all(allowed) {
        errors.add(
            "username",
            "Username may only contain letters, digits, dots, dashes and underscores",
        );
    }
}

impl RegisterUserForm {
    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.language = self.language.trim().to_lowercase();
    }

    /// Field-level checks that need no storage lookups.
    pub fn check(&self, supported_locales: &[String]) -> FormErrors {
        let mut errors = validate_form(self);
        check_username(&self.username, &mut errors);
        check_password_cap("password", &self.password, &mut errors);
        if self.password != self.password_confirmation {
            errors.add("password_confirmation", "Passwords do not match");
        }
        if !supported_locales.contains(&self.language) {
            errors.add("language", "Please choose a supported language");
        }
        errors
    }
}

impl EditUserForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            language: user.language.clone(),
            current_password: String::new(),
            new_password: String::new(),
        }
    }

    pub fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.language = self.language.trim().to_lowercase();
    }

    pub fn wants_password_change(&self) -> bool {
        !self.new_password.is_empty()
    }

    pub fn check(&self, supported_locales: &[String]) -> FormErrors {
        let mut errors = validate_form(self);
        check_username(&self.username, &mut errors);
        if !supported_locales.contains(&self.language) {
            errors.add("language", "Please choose a supported language");
        }
        if self.wants_password_change() {
            if self.new_password.chars().count() < MIN_PASSWORD_LENGTH {
                errors.add("new_password", "Password must be at least 8 characters");
            }
            check_password_cap("new_password", &self.new_password, &mut errors);
            if self.current_password.is_empty() {
                errors.add("current_password", "Enter your current password to change it");
            }
        }
        errors
    }

    /// Passwords are never echoed back into a redisplayed form.
    pub fn without_passwords(mut self) -> Self {
        self.current_password.clear();
        self.new_password.clear();
        self
    }
}

impl SearchUserForm {
    pub fn normalize(&mut self) {
        self.query = self.query.trim().to_string();
    }
}
