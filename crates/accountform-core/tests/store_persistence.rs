//! Integration tests for store persistence.
//!
//! These drive the store end to end against file-backed storage and a
//! backend that fails on demand.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;

use accountform_core::{
    Account, AccountField, AccountId, AccountPatch, AccountStore, Error, FileStorage,
    MemoryStorage, RecordType, StorageBackend, StoreConfig,
};

/// Backend that wraps memory storage and can be told to fail.
#[derive(Debug, Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_get: bool,
    fail_set: bool,
}

impl StorageBackend for FlakyStorage {
    fn get(&self, key: &str) -> accountform_core::Result<Option<String>> {
        if self.fail_get {
            return Err(Error::Storage("read refused".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> accountform_core::Result<()> {
        if self.fail_set {
            return Err(Error::Storage("quota exceeded".to_string()));
        }
        self.inner.set(key, value)
    }
}

fn valid_patch(login: &str) -> AccountPatch {
    AccountPatch::new().with_login(login).with_password("secret")
}

fn stored_ids<S: StorageBackend>(storage: &S, key: &str) -> HashSet<AccountId> {
    let raw = storage.get(key).unwrap().unwrap();
    let accounts: Vec<Account> = serde_json::from_str(&raw).unwrap();
    accounts.into_iter().map(|account| account.id).collect()
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::default().with_storage_dir(dir.path());

    let mut store = AccountStore::open(&config);
    assert!(store.is_empty());
    let id = store.create();
    store.update(
        &id,
        &valid_patch("alice").with_mark_string("admin; ops"),
    );
    store.validate_id(&id);
    store.save_or_prune();

    let reopened = AccountStore::open(&config);
    assert_eq!(reopened.accounts(), store.accounts());
    assert_eq!(reopened.get(&id).unwrap().mark_array.len(), 2);
}

#[test]
fn removed_account_not_restored() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = AccountStore::new(FileStorage::new(dir.path()), "accounts");
    let keep = store.create();
    let gone = store.create();
    store.update(&keep, &valid_patch("alice"));
    store.update(&gone, &valid_patch("bob"));
    store.save_or_prune();

    assert!(store.remove(&gone));
    store.restore();

    assert!(store.get(&gone).is_none());
    assert!(store.get(&keep).is_some());
}

#[test]
fn pruned_ids_are_previous_minus_failing() {
    let mut store = AccountStore::new(MemoryStorage::new(), "accounts");
    let ids: Vec<_> = (0..4).map(|_| store.create()).collect();
    for (n, id) in ids.iter().enumerate() {
        store.update(id, &valid_patch(&format!("user{n}")));
    }
    store.save_or_prune();
    let previous = stored_ids(store.storage(), "accounts");

    // Accounts created after the last save never reach storage while errors exist.
    let unsaved = store.create();
    store.update(&ids[1], &AccountPatch::new().with_login(" "));
    store.update(&ids[3], &AccountPatch::new().with_mark_string("x".repeat(60)));
    store.validate_id(&ids[1]);
    store.validate_id(&ids[3]);
    store.save_or_prune();

    let failing: HashSet<_> = store.errors().ids().cloned().collect();
    let expected: HashSet<_> = previous.difference(&failing).cloned().collect();
    assert_eq!(stored_ids(store.storage(), "accounts"), expected);
    assert!(!expected.contains(&unsaved));
}

#[test]
fn fixing_errors_saves_full_list_again() {
    let mut store = AccountStore::new(MemoryStorage::new(), "accounts");
    let id = store.create();
    store.validate_id(&id);
    assert_eq!(
        store.field_error(&id, AccountField::Login).map(ToString::to_string),
        Some("required field".to_string())
    );

    store.update(&id, &valid_patch("alice"));
    store.validate_id(&id);
    store.save_or_prune();

    assert_eq!(
        stored_ids(store.storage(), "accounts"),
        HashSet::from([id])
    );
}

#[test]
fn failing_set_leaves_memory_untouched() {
    let storage = FlakyStorage {
        fail_set: true,
        ..FlakyStorage::default()
    };
    let mut store = AccountStore::new(storage, "accounts");
    let a = store.create();
    let b = store.create();
    store.update(&a, &valid_patch("alice"));

    let before = store.accounts().to_vec();
    store.save_or_prune();
    assert_eq!(store.accounts(), before.as_slice());

    assert!(store.remove(&b));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&a).unwrap().login, "alice");
    assert_eq!(store.storage().inner.get("accounts").unwrap(), None);
}

#[test]
fn failing_get_during_prune_is_swallowed() {
    let storage = FlakyStorage {
        fail_get: true,
        ..FlakyStorage::default()
    };
    let mut store = AccountStore::new(storage, "accounts");
    let id = store.create();
    store.validate_id(&id);
    store.save_or_prune();
    assert_eq!(store.len(), 1);
}

#[test]
fn failing_get_on_restore_empties_list() {
    let mut store = AccountStore::new(FlakyStorage::default(), "accounts");
    store.create();
    store.save_or_prune();

    store.storage_mut().fail_get = true;
    store.restore();
    assert!(store.is_empty());
}

#[test]
fn ldap_accounts_stored_without_password() {
    let mut store = AccountStore::new(MemoryStorage::new(), "accounts");
    let id = store.create();
    store.update(&id, &valid_patch("carol"));
    store.update(&id, &AccountPatch::new().with_record_type(RecordType::Ldap));
    store.validate_id(&id);
    store.save_or_prune();

    let raw = store.storage().get("accounts").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["recordType"], "LDAP");
    assert!(value[0]["password"].is_null());
}
