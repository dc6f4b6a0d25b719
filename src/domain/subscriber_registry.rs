//! Connection registries for open event streams.
//!
//! Two plain collections, with no I/O and no locking of their own:
//!
//! - [`MonitorRegistry`]: ordered list of global monitor subscribers.
//! - [`InstanceRegistry`]: one slot per instance key. A new listener for a
//!   key overwrites the slot; removal compares subscriber identity so that a
//!   superseded stream's late disconnect never evicts its replacement.
//!
//! Synchronization is the caller's concern (see [`super::EventBus`]).

use std::collections::HashMap;

use super::{Subscriber, SubscriberId};

/// Ordered set of global monitor subscribers, unique by id.
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    subscribers: Vec<Subscriber>,
}

impl MonitorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber. Returns `false` (and keeps the existing entry)
    /// if a subscriber with the same id is already registered.
    pub fn add(&mut self, subscriber: Subscriber) -> bool {
        if self.contains(subscriber.id()) {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    /// Removes the subscriber with the given id. Removing an id that is not
    /// registered is a no-op returning `false`.
    pub fn remove(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id() != id);
        self.subscribers.len() != before
    }

    /// Returns `true` if a subscriber with the given id is registered.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.iter().any(|s| s.id() == id)
    }

    /// Registered subscribers in registration order.
    #[must_use]
    pub fn list(&self) -> &[Subscriber] {
        &self.subscribers
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Returns `true` if nobody is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

/// Single-slot-per-key registry of per-instance listeners.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    slots: HashMap<String, Subscriber>,
}

impl InstanceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subscriber` under `key`, returning the entry it superseded.
    ///
    /// The superseded subscriber is neither notified nor closed.
    pub fn add(&mut self, key: impl Into<String>, subscriber: Subscriber) -> Option<Subscriber> {
        self.slots.insert(key.into(), subscriber)
    }

    /// Removes the entry under `key` only if it is still `id`.
    ///
    /// Returns `false` for stale references and unknown keys.
    pub fn remove(&mut self, key: &str, id: SubscriberId) -> bool {
        match self.slots.get(key) {
            Some(current) if current.id() == id => {
                self.slots.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Returns the listener currently registered under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Subscriber> {
        self.slots.get(key)
    }

    /// Keys that currently have a listener, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.slots.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no instance has a listener.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
