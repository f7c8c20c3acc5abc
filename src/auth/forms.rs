use std::fmt;
use thiserror::Error;

use crate::gateway::types::{LoginRequest, RegisterRequest};
use crate::util::text::{is_blank, is_valid_email};

pub const USERNAME_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Username,
    Email,
    Password,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
            Self::Password => "password",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Мінімум 3 символи")]
    UsernameTooShort,
    #[error("Невалідний email")]
    InvalidEmail,
    #[error("Мінімум 6 символів")]
    PasswordTooShort,
    #[error("Введіть email")]
    EmailRequired,
    #[error("Це поле обов'язкове")]
    Required,
}

/// Every failing field of one form, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<(FormField, FormError)>);

impl FormErrors {
    fn push(&mut self, field: FormField, error: FormError) {
        self.0.push((field, error));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: FormField) -> Option<&FormError> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(FormField, FormError)> {
        self.0.iter()
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, err)| format!("{}: {err}", field.as_str()))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FormErrors {}

#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    /// Reports all invalid fields at once rather than stopping at the first.
    pub fn validate(&self) -> Result<RegisterRequest, FormErrors> {
        let mut errors = FormErrors::default();
        if self.username.chars().count() < USERNAME_MIN_CHARS {
            errors.push(FormField::Username, FormError::UsernameTooShort);
        }
        if !is_valid_email(&self.email) {
            errors.push(FormField::Email, FormError::InvalidEmail);
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.push(FormField::Password, FormError::PasswordTooShort);
        }
        errors.into_result(RegisterRequest {
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<LoginRequest, FormErrors> {
        let mut errors = FormErrors::default();
        if is_blank(&self.email) {
            errors.push(FormField::Email, FormError::Required);
        }
        if self.password.is_empty() {
            errors.push(FormField::Password, FormError::Required);
        }
        errors.into_result(LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }

    /// Address for re-sending the verification letter.
    pub fn resend_target(&self) -> Result<&str, FormError> {
        let email = self.email.trim();
        if email.is_empty() {
            Err(FormError::EmailRequired)
        } else {
            Ok(email)
        }
    }
}
