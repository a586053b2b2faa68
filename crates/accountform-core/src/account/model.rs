//! Account model types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::marks::parse_marks;

/// Unique identifier for an account.
///
/// Freshly created accounts get a random UUID; identifiers loaded from
/// storage are kept verbatim, whatever their format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an existing identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of credential an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// Credentials stored locally; a password is required.
    #[default]
    Local,
    /// Externally authenticated through LDAP; no password is kept.
    Ldap,
}

impl RecordType {
    /// Whether accounts of this type carry a password.
    #[must_use]
    pub const fn requires_password(self) -> bool {
        matches!(self, Self::Local)
    }

    /// Get display name for the record type.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Local => "Local",
            Self::Ldap => "LDAP",
        }
    }
}

/// One tag parsed out of an account's mark string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    /// Tag text, already trimmed.
    pub text: String,
}

impl Mark {
    /// Creates a mark with the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One account entry of the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Unique identifier, fixed at creation.
    pub id: AccountId,
    /// Semicolon-separated tag list as typed by the user.
    #[serde(default)]
    pub mark_string: String,
    /// Tags derived from `mark_string`.
    ///
    /// Only refreshed when an update carries a non-empty mark string, so it
    /// can lag behind `mark_string`.
    #[serde(default)]
    pub mark_array: Vec<Mark>,
    /// Credential kind.
    #[serde(default)]
    pub record_type: RecordType,
    /// Login name.
    #[serde(default)]
    pub login: String,
    /// Password, only kept for [`RecordType::Local`] accounts.
    #[serde(default)]
    pub password: Option<String>,
    /// Carried in the stored shape; no operation sets it.
    #[serde(default)]
    pub is_valid: bool,
}

impl Account {
    /// Create a new empty account with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::with_id(AccountId::generate())
    }

    /// Create a new empty account with the given identifier.
    #[must_use]
    pub fn with_id(id: AccountId) -> Self {
        Self {
            id,
            mark_string: String::new(),
            mark_array: Vec::new(),
            record_type: RecordType::Local,
            login: String::new(),
            password: None,
            is_valid: false,
        }
    }

    /// Returns a copy of this account with `patch` applied.
    ///
    /// Marks are re-parsed only when the patch carries a non-empty mark
    /// string. The password is dropped whenever the resulting record type
    /// does not use one.
    #[must_use]
    pub fn patched(&self, patch: &AccountPatch) -> Self {
        let mut account = self.clone();

        if let Some(mark_string) = &patch.mark_string {
            account.mark_string.clone_from(mark_string);
        }
        if let Some(record_type) = patch.record_type {
            account.record_type = record_type;
        }
        if let Some(login) = &patch.login {
            account.login.clone_from(login);
        }
        if let Some(password) = &patch.password {
            account.password.clone_from(password);
        }

        if patch.mark_string.as_deref().is_some_and(|s| !s.is_empty()) {
            account.mark_array = parse_marks(&account.mark_string);
        }

        if !account.record_type.requires_password() {
            account.password = None;
        }

        account
    }
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial update for an [`Account`].
///
/// Fields left as `None` are not part of the update. The identifier and the
/// validity flag cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    /// New mark string.
    pub mark_string: Option<String>,
    /// New record type.
    pub record_type: Option<RecordType>,
    /// New login.
    pub login: Option<String>,
    /// New password; `Some(None)` clears it.
    pub password: Option<Option<String>>,
}

impl AccountPatch {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mark string.
    #[must_use]
    pub fn with_mark_string(mut self, mark_string: impl Into<String>) -> Self {
        self.mark_string = Some(mark_string.into());
        self
    }

    /// Set the record type.
    #[must_use]
    pub const fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    /// Set the login.
    #[must_use]
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Some(password.into()));
        self
    }

    /// Clear the password.
    #[must_use]
    pub fn without_password(mut self) -> Self {
        self.password = Some(None);
        self
    }

    /// Returns true if the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.mark_string.is_none()
            && self.record_type.is_none()
            && self.login.is_none()
            && self.password.is_none()
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

    mod account_id_tests {
        use super::*;

        #[test]
        fn generate_is_unique() {
            let id1 = AccountId::generate();
            let id2 = AccountId::generate();
            assert_ne!(id1, id2);
        }

        #[test]
        fn display() {
            let id = AccountId::new("k3j9x0a1b2c");
            assert_eq!(format!("{id}"), "k3j9x0a1b2c");
        }

        #[test]
        fn serializes_as_plain_string() {
            let id = AccountId::new("abc");
            assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
        }
    }

    mod record_type_tests {
        use super::*;

        #[test]
        fn default_is_local() {
            assert_eq!(RecordType::default(), RecordType::Local);
        }

        #[test]
        fn only_local_requires_password() {
            assert!(RecordType::Local.requires_password());
            assert!(!RecordType::Ldap.requires_password());
        }

        #[test]
        fn wire_names() {
            assert_eq!(
                serde_json::to_string(&RecordType::Local).unwrap(),
                "\"LOCAL\""
            );
            assert_eq!(
                serde_json::from_str::<RecordType>("\"LDAP\"").unwrap(),
                RecordType::Ldap
            );
        }
    }

    mod account_tests {
        use super::*;

        #[test]
        fn new_creates_empty() {
            let account = Account::new();
            assert!(account.login.is_empty());
            assert!(account.password.is_none());
            assert!(account.mark_string.is_empty());
            assert!(account.mark_array.is_empty());
            assert_eq!(account.record_type, RecordType::Local);
            assert!(!account.is_valid);
        }

        #[test]
        fn json_shape() {
            let account = Account::with_id(AccountId::new("a1"));
            let value = serde_json::to_value(&account).unwrap();
            assert_eq!(
                value,
                serde_json::json!({
                    "id": "a1",
                    "markString": "",
                    "markArray": [],
                    "recordType": "LOCAL",
                    "login": "",
                    "password": null,
                    "isValid": false,
                })
            );
        }

        #[test]
        fn patched_recomputes_marks() {
            let account = Account::new();
            let patch = AccountPatch::new().with_mark_string("a; b ;;c");
            let updated = account.patched(&patch);
            assert_eq!(
                updated.mark_array,
                vec![Mark::new("a"), Mark::new("b"), Mark::new("c")]
            );
        }

        #[test]
        fn patched_keeps_marks_when_mark_string_untouched() {
            let mut account = Account::new();
            account.mark_string = "x;y".to_string();
            account.mark_array = vec![Mark::new("stale")];
            let updated = account.patched(&AccountPatch::new().with_login("bob"));
            assert_eq!(updated.mark_array, vec![Mark::new("stale")]);
        }

        #[test]
        fn patched_keeps_marks_when_mark_string_emptied() {
            let mut account = Account::new();
            account.mark_string = "x".to_string();
            account.mark_array = vec![Mark::new("x")];
            let updated = account.patched(&AccountPatch::new().with_mark_string(""));
            assert!(updated.mark_string.is_empty());
            assert_eq!(updated.mark_array, vec![Mark::new("x")]);
        }

        #[test]
        fn patched_ldap_drops_password() {
            let mut account = Account::new();
            account.password = Some("secret".to_string());
            let updated = account.patched(&AccountPatch::new().with_record_type(RecordType::Ldap));
            assert_eq!(updated.password, None);
        }

        #[test]
        fn patched_ldap_ignores_new_password() {
            let mut account = Account::new();
            account.record_type = RecordType::Ldap;
            let updated = account.patched(&AccountPatch::new().with_password("secret"));
            assert_eq!(updated.password, None);
        }

        #[test]
        fn patched_does_not_touch_original() {
            let account = Account::new();
            let updated = account.patched(&AccountPatch::new().with_login("alice"));
            assert!(account.login.is_empty());
            assert_eq!(updated.login, "alice");
            assert_eq!(updated.id, account.id);
        }
    }

    mod patch_tests {
        use super::*;

        #[test]
        fn empty_patch() {
            assert!(AccountPatch::new().is_empty());
            assert!(!AccountPatch::new().without_password().is_empty());
        }
    }
}
