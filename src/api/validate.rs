//! Client-side pre-flight checks. A failure here blocks the request.

use super::error::ApiError;
use crate::models::task::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::models::{NewTask, TaskUpdate};

pub const PASSWORD_MIN_CHARS: usize = 8;

pub fn email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::ValidationError(format!("Invalid email address: {email}"));

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

pub fn password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(ApiError::ValidationError(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters long"
        )));
    }
    Ok(())
}

/// Checks for the registration form. `confirmation` is only compared when
/// the front end collected one.
pub fn registration(
    email_addr: &str,
    pass: &str,
    confirmation: Option<&str>,
    name: &str,
) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::ValidationError("Name is required".to_string()));
    }
    email(email_addr)?;
    if let Some(confirm) = confirmation {
        if confirm != pass {
            return Err(ApiError::ValidationError(
                "Passwords do not match".to_string(),
            ));
        }
    }
    password(pass)
}

pub fn title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::ValidationError("Title is required".to_string()));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::ValidationError(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn description(description: &str) -> Result<(), ApiError> {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ApiError::ValidationError(format!(
            "Description must be at most {DESCRIPTION_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

pub fn new_task(task: &NewTask) -> Result<(), ApiError> {
    title(&task.title)?;
    if let Some(desc) = &task.description {
        description(desc)?;
    }
    Ok(())
}

pub fn task_update(update: &TaskUpdate) -> Result<(), ApiError> {
    if let Some(t) = &update.title {
        title(t)?;
    }
    if let Some(Some(desc)) = &update.description {
        description(desc)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert!(email("ada@example.com").is_ok());
        assert!(email("ada.l+todo@mail.example.org").is_ok());
        assert!(email("ada").is_err());
        assert!(email("@example.com").is_err());
        assert!(email("ada@example").is_err());
        assert!(email("ada@@example.com").is_err());
        assert!(email("ada @example.com").is_err());
        assert!(email("ada@example..com").is_err());
    }

    #[test]
    fn test_password_length_counts_chars() {
        assert!(password("1234567").is_err());
        assert!(password("12345678").is_ok());
        assert!(password("ééééééé").is_err());
    }

    #[test]
    fn test_registration_checks_confirmation() {
        let err = registration("ada@example.com", "longenough", Some("different"), "Ada")
            .unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: Passwords do not match");
        assert!(registration("ada@example.com", "longenough", None, "Ada").is_ok());
        assert!(registration("ada@example.com", "longenough", None, "  ").is_err());
    }

    #[test]
    fn test_title_bounds() {
        assert!(title("   ").is_err());
        assert!(title(&"x".repeat(TITLE_MAX_CHARS)).is_ok());
        assert!(title(&"x".repeat(TITLE_MAX_CHARS + 1)).is_err());
    }

    #[test]
    fn test_task_update_only_checks_present_fields() {
        assert!(task_update(&TaskUpdate::completed(true)).is_ok());
        let update = TaskUpdate {
            description: Some(Some("x".repeat(DESCRIPTION_MAX_CHARS + 1))),
            ..TaskUpdate::default()
        };
        assert!(task_update(&update).is_err());
    }
}
