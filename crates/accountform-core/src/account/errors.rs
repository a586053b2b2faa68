//! Per-account validation error map.

use std::collections::{BTreeMap, HashMap};

use super::model::AccountId;
use super::validation::{AccountField, ValidationError};

/// Validation errors of one account, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<AccountField, ValidationError>);

impl FieldErrors {
    /// Create an empty set of field errors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`, replacing any previous one.
    pub fn insert(&mut self, field: AccountField, error: ValidationError) {
        self.0.insert(field, error);
    }

    /// Clear the error for `field`.
    pub fn remove(&mut self, field: AccountField) -> Option<ValidationError> {
        self.0.remove(&field)
    }

    /// Get the error for `field`.
    #[must_use]
    pub fn get(&self, field: AccountField) -> Option<&ValidationError> {
        self.0.get(&field)
    }

    /// Get the display message for `field`.
    #[must_use]
    pub fn message(&self, field: AccountField) -> Option<String> {
        self.get(field).map(ValidationError::message)
    }

    /// Number of failing fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no field fails.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over failing fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (AccountField, &ValidationError)> {
        self.0.iter().map(|(field, error)| (*field, error))
    }
}

/// Validation errors for every account that currently fails.
///
/// An account with no failing field has no entry at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountErrors(HashMap<AccountId, FieldErrors>);

impl AccountErrors {
    /// Create an empty error map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the errors of `id`.
    ///
    /// An empty `errors` removes the entry.
    pub fn set(&mut self, id: AccountId, errors: FieldErrors) {
        if errors.is_empty() {
            self.0.remove(&id);
        } else {
            self.0.insert(id, errors);
        }
    }

    /// Drop every error of `id`.
    pub fn remove(&mut self, id: &AccountId) -> Option<FieldErrors> {
        self.0.remove(id)
    }

    /// Get the errors of `id`.
    #[must_use]
    pub fn get(&self, id: &AccountId) -> Option<&FieldErrors> {
        self.0.get(id)
    }

    /// Get the error of one field of `id`.
    #[must_use]
    pub fn field(&self, id: &AccountId, field: AccountField) -> Option<&ValidationError> {
        self.get(id).and_then(|errors| errors.get(field))
    }

    /// Returns true if `id` has at least one error.
    #[must_use]
    pub fn contains(&self, id: &AccountId) -> bool {
        self.0.contains_key(id)
    }

    /// Identifiers of all failing accounts.
    pub fn ids(&self) -> impl Iterator<Item = &AccountId> {
        self.0.keys()
    }

    /// Number of failing accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no account fails.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over failing accounts.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, &FieldErrors)> {
        self.0.iter()
    }
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

    fn login_required() -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.insert(AccountField::Login, ValidationError::Required);
        errors
    }

    #[test]
    fn set_and_get() {
        let mut map = AccountErrors::new();
        let id = AccountId::new("a");
        map.set(id.clone(), login_required());
        assert!(map.contains(&id));
        assert_eq!(
            map.field(&id, AccountField::Login),
            Some(&ValidationError::Required)
        );
        assert_eq!(map.field(&id, AccountField::Password), None);
    }

    #[test]
    fn empty_errors_remove_entry() {
        let mut map = AccountErrors::new();
        let id = AccountId::new("a");
        map.set(id.clone(), login_required());
        map.set(id.clone(), FieldErrors::new());
        assert!(!map.contains(&id));
        assert!(map.is_empty());
    }

    #[test]
    fn empty_errors_on_unknown_id_are_ignored() {
        let mut map = AccountErrors::new();
        map.set(AccountId::new("a"), FieldErrors::new());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn field_errors_iterate_in_field_order() {
        let mut errors = FieldErrors::new();
        errors.insert(AccountField::Password, ValidationError::Required);
        errors.insert(AccountField::MarkString, ValidationError::TooLong { max: 50 });
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec![AccountField::MarkString, AccountField::Password]);
    }

    #[test]
    fn field_message() {
        let errors = login_required();
        assert_eq!(
            errors.message(AccountField::Login).as_deref(),
            Some("required field")
        );
    }
}
