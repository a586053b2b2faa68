//! Account validation.

use super::errors::FieldErrors;
use super::model::Account;

/// Maximum length of a login, in characters.
pub const LOGIN_MAX_LEN: usize = 100;

/// Maximum length of a password, in characters.
pub const PASSWORD_MAX_LEN: usize = 100;

/// Maximum length of a mark string, in characters.
pub const MARK_STRING_MAX_LEN: usize = 50;

/// Validated form field of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountField {
    /// The mark string.
    MarkString,
    /// The login.
    Login,
    /// The password.
    Password,
}

impl AccountField {
    /// Get the field name as it appears in stored accounts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarkString => "markString",
            Self::Login => "login",
            Self::Password => "password",
        }
    }
}

impl std::fmt::Display for AccountField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for a single account field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty or whitespace only.
    Required,
    /// Field is longer than `max` characters.
    TooLong {
        /// Allowed length.
        max: usize,
    },
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("required field"),
            Self::TooLong { max } => write!(f, "max {max} characters"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate an account.
///
/// Returns every failing field with its error; an empty result means the
/// account is valid. Passwords of accounts whose record type carries none
/// are never checked.
#[must_use]
pub fn validate_account(account: &Account) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(error) = check_length(&account.mark_string, MARK_STRING_MAX_LEN) {
        errors.insert(AccountField::MarkString, error);
    }

    if let Some(error) = check_required(&account.login, LOGIN_MAX_LEN) {
        errors.insert(AccountField::Login, error);
    }

    if account.record_type.requires_password() {
        let password = account.password.as_deref().unwrap_or_default();
        if let Some(error) = check_required(password, PASSWORD_MAX_LEN) {
            errors.insert(AccountField::Password, error);
        }
    }

    errors
}

fn check_required(value: &str, max: usize) -> Option<ValidationError> {
    if value.trim().is_empty() {
        Some(ValidationError::Required)
    } else {
        check_length(value, max)
    }
}

fn check_length(value: &str, max: usize) -> Option<ValidationError> {
    (value.chars().count() > max).then_some(ValidationError::TooLong { max })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::account::RecordType;

    fn valid_account() -> Account {
        let mut account = Account::new();
        account.login = "alice".to_string();
        account.password = Some("secret".to_string());
        account
    }

    #[test]
    fn test_valid_account() {
        assert!(validate_account(&valid_account()).is_empty());
    }

    #[test]
    fn test_empty_local_account() {
        let account = Account::new();
        let errors = validate_account(&account);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get(AccountField::Login), Some(&ValidationError::Required));
        assert_eq!(
            errors.get(AccountField::Password),
            Some(&ValidationError::Required)
        );
    }

    #[test]
    fn test_whitespace_login_is_required() {
        let mut account = valid_account();
        account.login = "   \t".to_string();
        let errors = validate_account(&account);
        assert_eq!(errors.get(AccountField::Login), Some(&ValidationError::Required));
    }

    #[test]
    fn test_login_too_long() {
        let mut account = valid_account();
        account.login = "a".repeat(101);
        let errors = validate_account(&account);
        assert_eq!(
            errors.get(AccountField::Login),
            Some(&ValidationError::TooLong { max: 100 })
        );
    }

    #[test]
    fn test_login_at_limit() {
        let mut account = valid_account();
        account.login = "a".repeat(100);
        assert!(validate_account(&account).is_empty());
    }

    #[test]
    fn test_length_counts_characters() {
        let mut account = valid_account();
        account.login = "я".repeat(100);
        assert!(validate_account(&account).is_empty());
    }

    #[test]
    fn test_mark_string_too_long() {
        let mut account = valid_account();
        account.mark_string = "x".repeat(51);
        let errors = validate_account(&account);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(AccountField::MarkString).map(ValidationError::message),
            Some("max 50 characters".to_string())
        );
    }

    #[test]
    fn test_password_too_long() {
        let mut account = valid_account();
        account.password = Some("p".repeat(101));
        let errors = validate_account(&account);
        assert_eq!(
            errors.get(AccountField::Password).map(ValidationError::message),
            Some("max 100 characters".to_string())
        );
    }

    #[test]
    fn test_whitespace_password_is_required() {
        let mut account = valid_account();
        account.password = Some("  ".to_string());
        let errors = validate_account(&account);
        assert_eq!(
            errors.get(AccountField::Password),
            Some(&ValidationError::Required)
        );
    }

    #[test]
    fn test_ldap_password_never_checked() {
        let mut account = valid_account();
        account.record_type = RecordType::Ldap;
        account.password = Some("p".repeat(200));
        assert!(validate_account(&account).get(AccountField::Password).is_none());

        account.password = None;
        assert!(validate_account(&account).is_empty());
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::Required.message(), "required field");
        assert_eq!(
            ValidationError::TooLong { max: 50 }.message(),
            "max 50 characters"
        );
    }

    #[test]
    fn test_field_names() {
        assert_eq!(AccountField::MarkString.as_str(), "markString");
        assert_eq!(AccountField::Login.as_str(), "login");
        assert_eq!(AccountField::Password.as_str(), "password");
    }
}
