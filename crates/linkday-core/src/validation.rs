// ── Client-side validation ──
//
// Form rules checked before anything reaches the network. Every failure is
// a `CoreError::ValidationFailed` naming the offending field.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::CoreError;
use crate::model::{CreateLinkRequest, RegisterRequest, UpdateLinkRequest, UpdateProfileRequest};

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 200;
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 8;
pub const NAME_MAX: usize = 100;
pub const BIO_MAX: usize = 500;

/// Usernames that would collide with application routes.
pub const RESERVED_USERNAMES: &[&str] = &[
    "admin", "api", "www", "mail", "support", "help", "about", "privacy", "terms",
];

// ── Auth forms ───────────────────────────────────────────────────────

pub fn validate_login(email: &str, password: &SecretString) -> Result<(), CoreError> {
    validate_email(email)?;
    if password.expose_secret().is_empty() {
        return Err(CoreError::validation("password", "Password is required"));
    }
    Ok(())
}

pub fn validate_registration(request: &RegisterRequest) -> Result<(), CoreError> {
    validate_name(&request.name)?;
    validate_email(&request.email)?;
    validate_username(&request.username)?;
    validate_password(&request.password)
}

pub fn validate_email(email: &str) -> Result<(), CoreError> {
    let invalid = || CoreError::validation("email", "Invalid email address");
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() || domain.starts_with('.') {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if len < USERNAME_MIN {
        return Err(CoreError::validation(
            "username",
            format!("Username must be at least {USERNAME_MIN} characters"),
        ));
    }
    if len > USERNAME_MAX {
        return Err(CoreError::validation(
            "username",
            format!("Username must be at most {USERNAME_MAX} characters"),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CoreError::validation(
            "username",
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    if RESERVED_USERNAMES.contains(&username.to_ascii_lowercase().as_str()) {
        return Err(CoreError::validation("username", "This username is reserved"));
    }
    Ok(())
}

pub fn validate_password(password: &SecretString) -> Result<(), CoreError> {
    let raw = password.expose_secret();
    if raw.chars().count() < PASSWORD_MIN {
        return Err(CoreError::validation(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters"),
        ));
    }
    let has_lower = raw.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = raw.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(CoreError::validation(
            "password",
            "Password must contain at least one lowercase letter, one uppercase letter, and one number",
        ));
    }
    Ok(())
}

// ── Links ────────────────────────────────────────────────────────────

pub fn validate_new_link(request: &CreateLinkRequest) -> Result<(), CoreError> {
    validate_title(&request.title)?;
    validate_url(&request.url)?;
    if let Some(description) = &request.description {
        validate_description(description)?;
    }
    Ok(())
}

/// Only the fields present in the patch are checked.
pub fn validate_link_patch(patch: &UpdateLinkRequest) -> Result<(), CoreError> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(url) = &patch.url {
        validate_url(url)?;
    }
    if let Some(description) = &patch.description {
        validate_description(description)?;
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::validation("title", "Title is required"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(CoreError::validation(
            "title",
            format!("Title must be at most {TITLE_MAX} characters"),
        ));
    }
    Ok(())
}

fn validate_url(url: &str) -> Result<(), CoreError> {
    match Url::parse(url.trim()) {
        Ok(parsed) if !parsed.cannot_be_a_base() || parsed.scheme() == "mailto" => Ok(()),
        _ => Err(CoreError::validation("url", "Please enter a valid URL")),
    }
}

fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.chars().count() > DESCRIPTION_MAX {
        return Err(CoreError::validation(
            "description",
            format!("Description must be at most {DESCRIPTION_MAX} characters"),
        ));
    }
    Ok(())
}

// ── Profile ──────────────────────────────────────────────────────────

pub fn validate_profile(patch: &UpdateProfileRequest) -> Result<(), CoreError> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    if patch.bio.as_ref().is_some_and(|bio| bio.chars().count() > BIO_MAX) {
        return Err(CoreError::validation(
            "bio",
            format!("Bio must be at most {BIO_MAX} characters"),
        ));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("name", "Name is required"));
    }
    if name.chars().count() > NAME_MAX {
        return Err(CoreError::validation(
            "name",
            format!("Name must be at most {NAME_MAX} characters"),
        ));
    }
    Ok(())
}
