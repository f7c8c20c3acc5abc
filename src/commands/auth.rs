use std::path::Path;

use crate::auth::forms::PASSWORD_MIN_CHARS;
use crate::auth::{FormError, LoginForm, RegisterForm, Session};
use crate::draft::Confirm;
use crate::gateway::types::User;
use crate::gateway::{FileUpload, HttpGateway};
use crate::routes::Route;
use crate::survey::ImageRef;
use crate::util::text::is_valid_email;

use super::{require_session, CommandError};

pub const REGISTERED_MESSAGE: &str = "Реєстрація успішна! Перевірте email для підтвердження.";
pub const RESENT_MESSAGE: &str = "Email відправлено! Перевірте пошту.";
pub const LOGOUT_PROMPT: &str = "Ви впевнені, що хочете вийти?";

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    SignedIn(User),
    /// The account exists but its email is unconfirmed; the caller may offer
    /// [`resend_verification`].
    VerificationRequired { message: String },
}

pub async fn register(gateway: &HttpGateway, form: &RegisterForm) -> Result<String, CommandError> {
    let request = form.validate()?;
    gateway.register(&request).await?;
    tracing::info!(username = %request.username, "account registered");
    Ok(REGISTERED_MESSAGE.to_string())
}

pub async fn login(gateway: &HttpGateway, form: &LoginForm) -> Result<LoginOutcome, CommandError> {
    let request = form.validate()?;
    match gateway.login(&request).await {
        Ok(response) => {
            gateway.session().login(&response.token, &response.user)?;
            Ok(LoginOutcome::SignedIn(response.user))
        }
        Err(err) if err.requires_verification() => Ok(LoginOutcome::VerificationRequired {
            message: err.to_string(),
        }),
        Err(err) => Err(err.into()),
    }
}

pub async fn resend_verification(gateway: &HttpGateway, form: &LoginForm) -> Result<String, CommandError> {
    let email = form.resend_target()?;
    gateway.resend_verification(email).await?;
    Ok(RESENT_MESSAGE.to_string())
}

pub async fn verify_email(gateway: &HttpGateway, token: &str) -> Result<String, CommandError> {
    if token.trim().is_empty() {
        return Err(CommandError::Invalid("Токен не знайдено".to_string()));
    }
    let response = gateway.verify_email(token.trim()).await?;
    Ok(non_empty_or(response.message, "Email підтверджено"))
}

pub async fn forgot_password(gateway: &HttpGateway, email: &str) -> Result<String, CommandError> {
    if email.trim().is_empty() {
        return Err(FormError::EmailRequired.into());
    }
    if !is_valid_email(email.trim()) {
        return Err(FormError::InvalidEmail.into());
    }
    let response = gateway.forgot_password(email.trim()).await?;
    Ok(non_empty_or(response.message, RESENT_MESSAGE))
}

pub async fn reset_password(gateway: &HttpGateway, token: &str, password: &str) -> Result<String, CommandError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(FormError::PasswordTooShort.into());
    }
    let response = gateway.reset_password(token.trim(), password).await?;
    Ok(non_empty_or(response.message, "Пароль змінено"))
}

/// Clears the stored session once the user agrees.
pub fn logout(session: &Session, confirm: &dyn Confirm) -> Result<bool, CommandError> {
    if !confirm.confirm(LOGOUT_PROMPT) {
        return Ok(false);
    }
    session.logout()?;
    Ok(true)
}

/// Re-reads the profile from the server into the cached session user.
pub async fn refresh_profile(gateway: &HttpGateway) -> Result<User, CommandError> {
    let session = gateway.session();
    require_session(Route::Dashboard, session)?;
    let user = gateway.me().await?;
    if let Some(token) = session.token()? {
        session.login(&token, &user)?;
    }
    Ok(user)
}

pub async fn upload_avatar(gateway: &HttpGateway, path: &Path) -> Result<Option<ImageRef>, CommandError> {
    require_session(Route::Dashboard, gateway.session())?;
    let file = FileUpload::from_path(path)?;
    let avatar = gateway.upload_avatar(&file).await?;
    refresh_profile(gateway).await?;
    Ok(avatar)
}

pub async fn remove_avatar(gateway: &HttpGateway) -> Result<(), CommandError> {
    require_session(Route::Dashboard, gateway.session())?;
    gateway.delete_avatar().await?;
    refresh_profile(gateway).await?;
    Ok(())
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
