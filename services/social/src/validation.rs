//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Passwords too common to be accepted, compared case-insensitively
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "letmein1",
    "trustno1",
    "superman",
    "starwars",
    "whatever",
    "passw0rd",
    "qwerty123",
];

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.chars().count() > 150 {
        return Err("Username must be at most 150 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err(
            "Username can only contain letters, numbers, and @/./+/-/_ characters".to_string(),
        );
    }

    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password strength
///
/// Every failed rule is reported, not just the first one.
pub fn validate_password(password: &str, username: &str) -> Result<(), Vec<String>> {
    if password.is_empty() {
        return Err(vec!["Password is required".to_string()]);
    }

    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("Password must be at least 8 characters long".to_string());
    }

    if password.chars().count() > 128 {
        errors.push("Password must be at most 128 characters long".to_string());
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Password can't be entirely numeric".to_string());
    }

    if !username.is_empty() && password.to_lowercase().contains(&username.to_lowercase()) {
        errors.push("Password is too similar to the username".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push("Password is too common".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usernames() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("a.l+i-c_e@home").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("al").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username(&"x".repeat(151)).is_err());
    }

    #[test]
    fn test_emails() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("alice@example").is_err());
    }

    #[test]
    fn test_passwords() {
        assert!(validate_password("tender-lobster-42", "alice").is_ok());

        let errors = validate_password("1234567", "alice").unwrap_err();
        assert_eq!(errors.len(), 2);

        assert!(validate_password("alice-in-chains", "alice").is_err());
        assert!(validate_password("PassWord123", "bob").is_err());
        assert_eq!(
            validate_password("", "bob").unwrap_err(),
            vec!["Password is required".to_string()]
        );
    }
}
