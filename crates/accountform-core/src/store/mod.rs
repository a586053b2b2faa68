//! Account list store.
//!
//! Holds the ordered account list and the validation error map, and mirrors
//! the list into one key of a [`StorageBackend`].
//!
//! Only [`AccountStore::remove`] persists on its own. Creating and updating
//! accounts touches memory only; callers decide when to run
//! [`AccountStore::save_or_prune`]. Validation is never implicit either.

mod events;

pub use events::{StoreEvent, SubscriptionId};

use tracing::{debug, error, info};

use crate::account::{
    Account, AccountErrors, AccountField, AccountId, AccountPatch, ValidationError,
    validate_account,
};
use crate::config::StoreConfig;
use crate::storage::{FileStorage, StorageBackend};
use crate::Result;
use events::Listeners;

/// In-memory account list mirrored to a storage backend.
#[derive(Debug)]
pub struct AccountStore<S> {
    accounts: Vec<Account>,
    errors: AccountErrors,
    storage: S,
    storage_key: String,
    listeners: Listeners,
}

impl AccountStore<FileStorage> {
    /// Open a file-backed store and restore its accounts.
    ///
    /// Unreadable storage leaves the store empty.
    #[must_use]
    pub fn open(config: &StoreConfig) -> Self {
        let mut store = Self::with_config(FileStorage::new(&config.storage_dir), config);
        store.restore();
        store
    }
}

impl<S: StorageBackend> AccountStore<S> {
    /// Create an empty store persisting under `storage_key`.
    ///
    /// Nothing is read from storage until [`restore`](Self::restore).
    #[must_use]
    pub fn new(storage: S, storage_key: impl Into<String>) -> Self {
        Self {
            accounts: Vec::new(),
            errors: AccountErrors::new(),
            storage,
            storage_key: storage_key.into(),
            listeners: Listeners::default(),
        }
    }

    /// Create an empty store using the key from `config`.
    #[must_use]
    pub fn with_config(storage: S, config: &StoreConfig) -> Self {
        Self::new(storage, config.storage_key.clone())
    }

    /// Accounts in insertion order.
    #[must_use]
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Get account by ID.
    #[must_use]
    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == *id)
    }

    /// Current validation errors.
    #[must_use]
    pub const fn errors(&self) -> &AccountErrors {
        &self.errors
    }

    /// Validation error of one field of one account.
    #[must_use]
    pub fn field_error(&self, id: &AccountId, field: AccountField) -> Option<&ValidationError> {
        self.errors.field(id, field)
    }

    /// Returns true if any account currently fails validation.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Returns true if there are no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Key the account list is stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage backend.
    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Register a listener called after every change.
    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.listeners.add(Box::new(listener))
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Append a new empty account and return its ID.
    pub fn create(&mut self) -> AccountId {
        let mut id = AccountId::generate();
        while self.get(&id).is_some() {
            id = AccountId::generate();
        }

        self.accounts.push(Account::with_id(id.clone()));
        debug!("Created account {id}");
        self.listeners.emit(&StoreEvent::AccountsChanged);
        id
    }

    /// Apply `patch` to the account `id`.
    ///
    /// The stored record is replaced by a patched copy. Unknown IDs are
    /// ignored. Returns whether the account was found.
    pub fn update(&mut self, id: &AccountId, patch: &AccountPatch) -> bool {
        let Some(slot) = self.accounts.iter_mut().find(|account| account.id == *id) else {
            debug!("Update of unknown account {id} ignored");
            return false;
        };

        *slot = slot.patched(patch);
        debug!("Updated account {id}");
        self.listeners.emit(&StoreEvent::AccountsChanged);
        true
    }

    /// Remove the account `id`, then sync storage.
    ///
    /// Storage is synced even if `id` was unknown. Returns whether an account
    /// was removed.
    pub fn remove(&mut self, id: &AccountId) -> bool {
        let before = self.accounts.len();
        self.accounts.retain(|account| account.id != *id);
        let removed = self.accounts.len() != before;

        if removed {
            debug!("Removed account {id}");
            self.listeners.emit(&StoreEvent::AccountsChanged);
        }

        self.save_or_prune();
        removed
    }

    /// Recompute the validation errors of `account`.
    ///
    /// The error map entry for its ID is replaced; an account without errors
    /// loses its entry.
    pub fn validate(&mut self, account: &Account) {
        let field_errors = validate_account(account);
        if !field_errors.is_empty() {
            debug!(
                "Account {} has {} invalid field(s)",
                account.id,
                field_errors.len()
            );
        }

        self.errors.set(account.id.clone(), field_errors);
        self.listeners.emit(&StoreEvent::ErrorsChanged {
            id: account.id.clone(),
        });
    }

    /// Validate the stored copy of account `id`.
    ///
    /// Returns false if the ID is unknown.
    pub fn validate_id(&mut self, id: &AccountId) -> bool {
        let Some(account) = self.get(id).cloned() else {
            return false;
        };
        self.validate(&account);
        true
    }

    /// Sync the account list to storage.
    ///
    /// Without validation errors the whole list is written. Otherwise the
    /// stored list is re-read and every failing account stripped from it,
    /// leaving the other stored entries as they were. Failures are logged
    /// and leave memory untouched.
    pub fn save_or_prune(&mut self) {
        match self.try_save_or_prune() {
            Ok(true) => self.listeners.emit(&StoreEvent::Persisted),
            Ok(false) => debug!("Nothing stored under {:?}, nothing to prune", self.storage_key),
            Err(e) => error!("Failed to save accounts to storage: {e}"),
        }
    }

    /// Replace the account list with the stored one.
    ///
    /// Absent storage leaves the list unchanged. Unreadable or corrupt
    /// storage empties it.
    pub fn restore(&mut self) {
        match self.read_stored() {
            Ok(Some(accounts)) => {
                info!("Restored {} account(s) from storage", accounts.len());
                self.accounts = accounts;
                self.listeners.emit(&StoreEvent::AccountsChanged);
            }
            Ok(None) => debug!("No accounts stored under {:?}", self.storage_key),
            Err(e) => {
                error!("Failed to load accounts from storage: {e}");
                self.accounts.clear();
                self.listeners.emit(&StoreEvent::AccountsChanged);
            }
        }
    }

    /// Returns whether anything was written.
    fn try_save_or_prune(&mut self) -> Result<bool> {
        if self.errors.is_empty() {
            let json = serde_json::to_string(&self.accounts)?;
            self.storage.set(&self.storage_key, &json)?;
            debug!("Saved {} account(s)", self.accounts.len());
            return Ok(true);
        }

        let Some(mut stored) = self.read_stored()? else {
            return Ok(false);
        };

        let before = stored.len();
        stored.retain(|account| !self.errors.contains(&account.id));
        let json = serde_json::to_string(&stored)?;
        self.storage.set(&self.storage_key, &json)?;
        debug!(
            "Pruned {} invalid account(s) from storage",
            before - stored.len()
        );
        Ok(true)
    }

    fn read_stored(&self) -> Result<Option<Vec<Account>>> {
        match self.storage.get(&self.storage_key)? {
            Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
            _ => Ok(None),
        }
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
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;
    use crate::account::{Mark, RecordType};
    use crate::storage::MemoryStorage;

    const KEY: &str = "accounts";

    fn store() -> AccountStore<MemoryStorage> {
        AccountStore::new(MemoryStorage::new(), KEY)
    }

    fn stored_ids(store: &AccountStore<MemoryStorage>) -> Vec<String> {
        let raw = store.storage().get(KEY).unwrap().unwrap();
        let accounts: Vec<Account> = serde_json::from_str(&raw).unwrap();
        accounts.into_iter().map(|a| a.id.to_string()).collect()
    }

    fn valid_patch(login: &str) -> AccountPatch {
        AccountPatch::new().with_login(login).with_password("secret")
    }

    mod create_tests {
        use super::*;

        #[test]
        fn appends_default_account() {
            let mut store = store();
            let id = store.create();
            assert_eq!(store.len(), 1);
            let account = store.get(&id).unwrap();
            assert_eq!(account.record_type, RecordType::Local);
            assert!(account.password.is_none());
            assert!(!account.is_valid);
        }

        #[test]
        fn keeps_insertion_order() {
            let mut store = store();
            let ids: Vec<_> = (0..3).map(|_| store.create()).collect();
            let listed: Vec<_> = store.accounts().iter().map(|a| a.id.clone()).collect();
            assert_eq!(listed, ids);
        }

        #[test]
        fn does_not_persist() {
            let mut store = store();
            store.create();
            assert_eq!(store.storage().get(KEY).unwrap(), None);
        }

        proptest! {
            #[test]
            fn ids_are_distinct(count in 1usize..64) {
                let mut store = store();
                let ids: HashSet<_> = (0..count).map(|_| store.create()).collect();
                prop_assert_eq!(ids.len(), count);
            }
        }
    }

    mod update_tests {
        use super::*;

        #[test]
        fn parses_marks() {
            let mut store = store();
            let id = store.create();
            assert!(store.update(&id, &AccountPatch::new().with_mark_string("a; b ;;c")));
            assert_eq!(
                store.get(&id).unwrap().mark_array,
                vec![Mark::new("a"), Mark::new("b"), Mark::new("c")]
            );
        }

        #[test]
        fn ldap_clears_password() {
            let mut store = store();
            let id = store.create();
            store.update(&id, &valid_patch("alice"));
            store.update(&id, &AccountPatch::new().with_record_type(RecordType::Ldap));
            assert_eq!(store.get(&id).unwrap().password, None);
        }

        #[test]
        fn unknown_id_is_noop() {
            let mut store = store();
            store.create();
            let before = store.accounts().to_vec();
            assert!(!store.update(&AccountId::new("missing"), &valid_patch("x")));
            assert_eq!(store.accounts(), before.as_slice());
        }

        #[test]
        fn replaces_in_place() {
            let mut store = store();
            let first = store.create();
            let second = store.create();
            store.update(&first, &valid_patch("alice"));
            assert_eq!(store.accounts()[0].id, first);
            assert_eq!(store.accounts()[0].login, "alice");
            assert_eq!(store.accounts()[1].id, second);
        }

        #[test]
        fn does_not_validate() {
            let mut store = store();
            let id = store.create();
            store.update(&id, &AccountPatch::new().with_login(""));
            assert!(!store.has_errors());
        }
    }

    mod validate_tests {
        use super::*;

        #[test]
        fn empty_local_account_has_two_errors() {
            let mut store = store();
            let id = store.create();
            store.validate_id(&id);
            let errors = store.errors().get(&id).unwrap();
            assert_eq!(errors.len(), 2);
            assert_eq!(
                errors.message(AccountField::Login).as_deref(),
                Some("required field")
            );
            assert_eq!(
                errors.message(AccountField::Password).as_deref(),
                Some("required field")
            );
        }

        #[test]
        fn fixed_account_loses_entry() {
            let mut store = store();
            let id = store.create();
            store.validate_id(&id);
            assert!(store.errors().contains(&id));

            store.update(&id, &valid_patch("alice"));
            store.validate_id(&id);
            assert!(!store.errors().contains(&id));
            assert!(!store.has_errors());
        }

        #[test]
        fn ldap_long_password_is_fine() {
            let mut store = store();
            let id = store.create();
            store.update(
                &id,
                &AccountPatch::new()
                    .with_login("bob")
                    .with_record_type(RecordType::Ldap),
            );
            let mut account = store.get(&id).unwrap().clone();
            account.password = Some("p".repeat(200));
            store.validate(&account);
            assert_eq!(store.field_error(&id, AccountField::Password), None);
        }

        #[test]
        fn validates_given_copy_not_stored_one() {
            let mut store = store();
            let id = store.create();
            let mut draft = store.get(&id).unwrap().clone();
            draft.login = "alice".to_string();
            draft.password = Some("secret".to_string());
            store.validate(&draft);
            assert!(!store.has_errors());
            assert!(store.get(&id).unwrap().login.is_empty());
        }

        #[test]
        fn unknown_id() {
            let mut store = store();
            assert!(!store.validate_id(&AccountId::new("missing")));
        }
    }

    mod persistence_tests {
        use super::*;

        #[test]
        fn saves_everything_without_errors() {
            let mut store = store();
            let a = store.create();
            let b = store.create();
            store.save_or_prune();
            assert_eq!(stored_ids(&store), vec![a.to_string(), b.to_string()]);
        }

        #[test]
        fn prunes_failing_accounts() {
            let mut store = store();
            let good = store.create();
            let bad = store.create();
            store.update(&good, &valid_patch("alice"));
            store.update(&bad, &valid_patch("bob"));
            store.save_or_prune();

            store.update(&bad, &AccountPatch::new().with_login(""));
            store.validate_id(&bad);
            store.save_or_prune();

            assert_eq!(stored_ids(&store), vec![good.to_string()]);
        }

        #[test]
        fn prune_keeps_last_saved_snapshot() {
            let mut store = store();
            let good = store.create();
            let bad = store.create();
            store.update(&good, &valid_patch("alice"));
            store.save_or_prune();

            store.update(&good, &AccountPatch::new().with_login("renamed"));
            store.validate_id(&bad);
            store.save_or_prune();

            let raw = store.storage().get(KEY).unwrap().unwrap();
            let stored: Vec<Account> = serde_json::from_str(&raw).unwrap();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].login, "alice");
        }

        #[test]
        fn prune_without_stored_value_writes_nothing() {
            let mut store = store();
            let id = store.create();
            store.validate_id(&id);
            store.save_or_prune();
            assert_eq!(store.storage().get(KEY).unwrap(), None);
        }

        #[test]
        fn corrupt_storage_is_left_alone_on_prune() {
            let mut store = AccountStore::new(MemoryStorage::with_entry(KEY, "{oops"), KEY);
            let id = store.create();
            store.validate_id(&id);
            store.save_or_prune();
            assert_eq!(store.storage().get(KEY).unwrap().as_deref(), Some("{oops"));
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn remove_persists() {
            let mut store = store();
            let keep = store.create();
            let gone = store.create();
            assert!(store.remove(&gone));
            assert_eq!(stored_ids(&store), vec![keep.to_string()]);
        }

        #[test]
        fn remove_unknown_still_syncs() {
            let mut store = store();
            store.create();
            assert!(!store.remove(&AccountId::new("missing")));
            assert_eq!(stored_ids(&store).len(), 1);
        }

        #[test]
        fn restore_replaces_list() {
            let mut store = store();
            let id = store.create();
            store.update(&id, &valid_patch("alice"));
            store.save_or_prune();

            let raw = store.storage().get(KEY).unwrap().unwrap();
            let mut fresh = AccountStore::new(MemoryStorage::with_entry(KEY, raw), KEY);
            fresh.create();
            fresh.restore();
            assert_eq!(fresh.accounts(), store.accounts());
        }

        #[test]
        fn restore_absent_keeps_list() {
            let mut store = store();
            store.create();
            store.restore();
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn restore_empty_string_keeps_list() {
            let mut store = AccountStore::new(MemoryStorage::with_entry(KEY, ""), KEY);
            store.create();
            store.restore();
            assert_eq!(store.len(), 1);
        }

        #[test]
        fn restore_corrupt_empties_list() {
            let mut store = AccountStore::new(MemoryStorage::with_entry(KEY, "not json"), KEY);
            store.create();
            store.restore();
            assert!(store.is_empty());
        }

        #[test]
        fn restore_keeps_legacy_ids() {
            let raw = r#"[{"id":"k3j9x0a1b2c","markString":"a;b","markArray":[{"text":"a"},{"text":"b"}],"recordType":"LDAP","login":"bob","password":null,"isValid":false}]"#;
            let mut store = AccountStore::new(MemoryStorage::with_entry(KEY, raw), KEY);
            store.restore();
            let account = store.get(&AccountId::new("k3j9x0a1b2c")).unwrap();
            assert_eq!(account.record_type, RecordType::Ldap);
            assert_eq!(account.mark_array.len(), 2);
        }
    }

    mod event_tests {
        use super::*;

        fn recorded(store: &mut AccountStore<MemoryStorage>) -> Rc<RefCell<Vec<StoreEvent>>> {
            let events = Rc::new(RefCell::new(Vec::new()));
            let sink = Rc::clone(&events);
            store.subscribe(move |event| sink.borrow_mut().push(event.clone()));
            events
        }

        #[test]
        fn mutations_notify() {
            let mut store = store();
            let events = recorded(&mut store);

            let id = store.create();
            store.update(&id, &valid_patch("alice"));
            store.validate_id(&id);
            store.remove(&id);

            assert_eq!(
                *events.borrow(),
                vec![
                    StoreEvent::AccountsChanged,
                    StoreEvent::AccountsChanged,
                    StoreEvent::ErrorsChanged { id },
                    StoreEvent::AccountsChanged,
                    StoreEvent::Persisted,
                ]
            );
        }

        #[test]
        fn noop_update_is_silent() {
            let mut store = store();
            let events = recorded(&mut store);
            store.update(&AccountId::new("missing"), &valid_patch("x"));
            assert!(events.borrow().is_empty());
        }

        #[test]
        fn unsubscribe_stops_events() {
            let mut store = store();
            let count = Rc::new(RefCell::new(0));
            let counter = Rc::clone(&count);
            let sub = store.subscribe(move |_| *counter.borrow_mut() += 1);
            store.create();
            assert!(store.unsubscribe(sub));
            store.create();
            assert_eq!(*count.borrow(), 1);
            assert_eq!(store.listener_count(), 0);
        }
    }
}
