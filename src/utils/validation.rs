use crate::utils::error::CustomError;

/// Validate a guest author's e-mail address. Empty input is allowed; the
/// field is optional for anonymous submissions.
pub fn validate_author_email(email: &str) -> Result<(), CustomError> {
    if email.is_empty() {
        return Ok(());
    }

    if email.len() > 100 {
        return Err(CustomError::ValidationError(
            "invalid value for parameter `author_email`: too long".into(),
        ));
    }

    let has_at = email.contains('@');
    let has_dot = email.rsplit('@').next().is_some_and(|d| d.contains('.'));
    let has_space = email.chars().any(|c| c.is_whitespace());

    if !has_at || !has_dot || has_space {
        return Err(CustomError::ValidationError(
            "invalid value for parameter `author_email`".into(),
        ));
    }

    Ok(())
}

/// Validate a guest author's URL. Empty input is allowed.
pub fn validate_author_url(url: &str) -> Result<(), CustomError> {
    if url.is_empty() {
        return Ok(());
    }

    if url.len() > 200 {
        return Err(CustomError::ValidationError(
            "invalid value for parameter `author_url`: too long".into(),
        ));
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CustomError::ValidationError(
            "invalid value for parameter `author_url`".into(),
        ));
    }

    Ok(())
}
