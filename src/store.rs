// Deduplicated template index
//
// Identifiers accumulate idempotently; a name, once set, is immutable
// (first-write-wins). Absence of a mapping is the canonical "unknown name"
// state, so an empty string is never stored.

use crate::classifier::VALUE_EXCLUDES;
use fxhash::{FxHashMap, FxHashSet};
use serde::Serialize;

/// One row of the harvested index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
}

/// Change callbacks carry no payload; consumers re-pull via `snapshot()`.
pub type Subscriber = Box<dyn Fn() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct TemplateStore {
    ids: FxHashSet<String>,
    names: FxHashMap<String, String>,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscription: u64,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation. Returns whether store state changed; only
    /// changes fire subscriber notifications.
    pub fn insert(&mut self, id: &str, name: &str) -> bool {
        let id = id.trim();
        if id.is_empty() {
            return false;
        }
        let mut name = name.trim();
        if VALUE_EXCLUDES.is_match(name) {
            name = "";
        }

        let mut changed = self.ids.insert(id.to_string());
        if !name.is_empty() && !self.names.contains_key(id) {
            self.names.insert(id.to_string(), name.to_string());
            changed = true;
        }
        if changed {
            self.notify();
        }
        changed
    }

    /// Every known identifier exactly once, with its name or "", sorted
    /// case-insensitively by id. The ordering is part of the export
    /// contract; byte order breaks case-insensitive ties deterministically.
    pub fn snapshot(&self) -> Vec<TemplateRecord> {
        let mut records: Vec<TemplateRecord> = self
            .ids
            .iter()
            .map(|id| TemplateRecord {
                id: id.clone(),
                name: self.names.get(id).cloned().unwrap_or_default(),
            })
            .collect();

        records.sort_by(|a, b| {
            a.id.to_lowercase()
                .cmp(&b.id.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        records
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Drop everything. Notifies only when there was something to drop.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }
        self.ids.clear();
        self.names.clear();
        self.notify();
    }

    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id.0);
    }

    fn notify(&self) {
        for (_, subscriber) in &self.subscribers {
            subscriber();
        }
    }
}
