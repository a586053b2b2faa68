//! Change notification for store observers.

use crate::account::AccountId;

/// Change made to an [`AccountStore`](super::AccountStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The account list changed.
    AccountsChanged,
    /// The validation errors of one account were recomputed.
    ErrorsChanged {
        /// Account that was validated.
        id: AccountId,
    },
    /// The account list was written to storage.
    Persisted,
}

/// Handle returned by [`AccountStore::subscribe`](super::AccountStore::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// Registered listeners, called in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &StoreEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
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
    use std::rc::Rc;

    use super::*;

    #[test]
    fn emits_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::default();
        for n in 0..3 {
            let seen = Rc::clone(&seen);
            listeners.add(Box::new(move |_: &StoreEvent| seen.borrow_mut().push(n)));
        }
        listeners.emit(&StoreEvent::Persisted);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn removed_listener_not_called() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::default();
        let counter = Rc::clone(&count);
        let id = listeners.add(Box::new(move |_: &StoreEvent| *counter.borrow_mut() += 1));
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        listeners.emit(&StoreEvent::AccountsChanged);
        assert_eq!(*count.borrow(), 0);
        assert_eq!(listeners.len(), 0);
    }
}
