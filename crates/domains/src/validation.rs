//! Field rules shared by the services and both HTTP surfaces.

use crate::error::{DomainError, Result};

pub const MAX_USERNAME_LEN: usize = 150;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_GROUP_TITLE_LEN: usize = 200;
pub const MAX_SLUG_LEN: usize = 50;
/// Width of the `image` column.
pub const MAX_IMAGE_PATH_LEN: usize = 100;

/// First path segments of the rendered site. A user with one of these names
/// would have an unreachable profile page.
pub const RESERVED_USERNAMES: &[&str] = &["api", "auth", "group", "new", "follow", "media", "metrics"];

/// Rejects text that is empty after trimming. Returns the text unchanged.
pub fn required_text(field: &str, text: String) -> Result<String> {
    if text.trim().is_empty() {
        return Err(DomainError::ValidationError(format!("{field} may not be blank")));
    }
    Ok(text)
}

pub fn username(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::ValidationError(format!(
            "username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if !name.chars().all(allowed) {
        return Err(DomainError::ValidationError(
            "username may contain only letters, digits and @/./+/-/_".into(),
        ));
    }
    if RESERVED_USERNAMES.contains(&name.to_lowercase().as_str()) {
        return Err(DomainError::ValidationError(format!("username '{name}' is reserved")));
    }
    Ok(())
}

pub fn password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::ValidationError(format!(
            "password must contain at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(DomainError::ValidationError("password is entirely numeric".into()));
    }
    Ok(())
}

/// `[-a-zA-Z0-9_]{1,50}`
pub fn slug(slug: &str) -> Result<()> {
    let valid = !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(DomainError::ValidationError(format!(
            "slug must be 1 to {MAX_SLUG_LEN} letters, digits, hyphens or underscores"
        )));
    }
    Ok(())
}

pub fn group_title(title: &str) -> Result<()> {
    if title.trim().is_empty() || title.chars().count() > MAX_GROUP_TITLE_LEN {
        return Err(DomainError::ValidationError(format!(
            "title must be 1 to {MAX_GROUP_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// A stored image reference: a relative path under the media root,
/// e.g. `posts/cat.png`.
pub fn image_path(path: &str) -> Result<()> {
    if path.is_empty() || path.chars().count() > MAX_IMAGE_PATH_LEN {
        return Err(DomainError::ValidationError(format!(
            "image path must be 1 to {MAX_IMAGE_PATH_LEN} characters"
        )));
    }
    let relative = !path.starts_with('/')
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
        && path.split('/').all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if !relative {
        return Err(DomainError::ValidationError(
            "image must be a relative path inside the media directory".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(required_text("text", "   \n".into()).is_err());
        assert_eq!(required_text("text", " hi ".into()).unwrap(), " hi ");
    }

    #[test]
    fn usernames_follow_auth_rules() {
        assert!(username("leo.tolstoy+1@ya_ru").is_ok());
        assert!(username("").is_err());
        assert!(username("with space").is_err());
        assert!(username("API").is_err());
        assert!(username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn weak_passwords_are_rejected() {
        assert!(password("short").is_err());
        assert!(password("12345678").is_err());
        assert!(password("correct horse").is_ok());
    }

    #[test]
    fn slugs_are_url_safe() {
        assert!(slug("cats_and-dogs2").is_ok());
        assert!(slug("").is_err());
        assert!(slug("no/slash").is_err());
        assert!(slug("кошки").is_err());
        assert!(slug(&"a".repeat(51)).is_err());
    }

    #[test]
    fn image_paths_stay_inside_media() {
        assert!(image_path("posts/cat.png").is_ok());
        assert!(image_path(&format!("posts/{}", "a".repeat(94))).is_ok());
        assert!(image_path(&format!("posts/{}", "a".repeat(95))).is_err());
        assert!(image_path("").is_err());
        assert!(image_path("/etc/passwd").is_err());
        assert!(image_path("posts/../../secret").is_err());
        assert!(image_path("posts//cat.png").is_err());
        assert!(image_path("posts\\cat.png").is_err());
    }
}
