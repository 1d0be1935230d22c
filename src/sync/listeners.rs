//! Single-threaded callback registry shared by the channel adapter and the
//! reactive stores.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Registry<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T: ?Sized> Registry<T> {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }
}

pub struct Listeners<T: ?Sized + 'static> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: ?Sized + 'static> Listeners<T> {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            let callback: Callback<T> = Rc::new(RefCell::new(callback));
            registry.entries.push((id, callback));
            id
        };

        let registry: Weak<RefCell<Registry<T>>> = Rc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .entries
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Calls every callback registered at the time of the call, skipping any
    /// that got unsubscribed by an earlier callback in the same pass.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<(u64, Callback<T>)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .map(|(id, callback)| (*id, Rc::clone(callback)))
            .collect();

        for (id, callback) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }
            // Re-entrant notify from inside the same callback is skipped.
            if let Ok(mut callback) = callback.try_borrow_mut() {
                (&mut *callback)(value);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: ?Sized + 'static> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a registered callback. Dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Keeps the callback registered for as long as its source lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_until_unsubscribed() {
        let listeners = Listeners::<str>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let subscription =
            listeners.subscribe(move |name: &str| sink.borrow_mut().push(name.to_string()));
        listeners.notify("alice");
        subscription.unsubscribe();
        listeners.notify("bob");

        assert_eq!(*seen.borrow(), vec!["alice".to_string()]);
        assert!(listeners.is_empty());
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let listeners = Listeners::<u32>::new();
        let total = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&total);
        listeners.subscribe(move |value| *sink.borrow_mut() += *value).detach();
        listeners.notify(&3);
        listeners.notify(&4);

        assert_eq!(*total.borrow(), 7);
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn callback_removed_mid_pass_is_skipped() {
        let listeners = Listeners::<()>::new();
        let calls = Rc::new(RefCell::new(0));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let slot = Rc::clone(&victim);
        let first = listeners.subscribe(move |_| {
            slot.borrow_mut().take();
        });
        let counter = Rc::clone(&calls);
        *victim.borrow_mut() = Some(listeners.subscribe(move |_| *counter.borrow_mut() += 1));

        listeners.notify(&());

        assert_eq!(*calls.borrow(), 0);
        assert_eq!(listeners.len(), 1);
        drop(first);
    }
}
