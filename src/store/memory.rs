use std::sync::{Mutex, PoisonError};

use crate::model::{Client, Key, Project};


/// Clients and projects kept in memory. Records are kept in key order, which
/// is also their insertion order as keys are only ever increasing.
pub(crate) struct MemoryStore {
    clients: Mutex<Collection<Client>>,
    projects: Mutex<Collection<Project>>,
}

impl MemoryStore {
    /// Creates an empty store. The first key assigned to each kind of record
    /// is 1.
    pub(crate) fn new() -> Self {
        Self::with_records(vec![], vec![])
    }

    pub(crate) fn with_records(clients: Vec<Client>, projects: Vec<Project>) -> Self {
        Self {
            clients: Mutex::new(Collection::from_records(clients)),
            projects: Mutex::new(Collection::from_records(projects)),
        }
    }

    /// Runs `f` with the locked client collection. The lock is never held
    /// across an `await`.
    pub(super) fn clients<R>(&self, f: impl FnOnce(&mut Collection<Client>) -> R) -> R {
        // Poisoning can only happen when a panic occurs while the lock is
        // held. All operations leave the collection in a consistent state at
        // every point, so we just continue.
        f(&mut self.clients.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub(super) fn projects<R>(&self, f: impl FnOnce(&mut Collection<Project>) -> R) -> R {
        f(&mut self.projects.lock().unwrap_or_else(PoisonError::into_inner))
    }
}


pub(super) trait Record: Clone {
    fn key(&self) -> Key;
}

impl Record for Client {
    fn key(&self) -> Key {
        self.key
    }
}

impl Record for Project {
    fn key(&self) -> Key {
        self.key
    }
}

/// Records of one kind, sorted by key.
pub(super) struct Collection<T> {
    records: Vec<T>,
    next_key: u64,
}

impl<T: Record> Collection<T> {
    fn from_records(mut records: Vec<T>) -> Self {
        records.sort_by_key(|r| r.key());
        records.dedup_by_key(|r| r.key());
        let next_key = records.last().map_or(1, |r| r.key().0 + 1);
        Self { records, next_key }
    }

    fn position(&self, key: Key) -> Option<usize> {
        self.records.binary_search_by_key(&key, |r| r.key()).ok()
    }

    pub(super) fn all(&self) -> Vec<T> {
        self.records.clone()
    }

    pub(super) fn get(&self, key: Key) -> Option<T> {
        self.position(key).map(|idx| self.records[idx].clone())
    }

    /// Assigns a fresh key, creates the record via `create` and stores it.
    pub(super) fn insert(&mut self, create: impl FnOnce(Key) -> T) -> T {
        let key = Key(self.next_key);
        self.next_key += 1;

        let record = create(key);
        debug_assert_eq!(record.key(), key);
        self.records.push(record.clone());
        record
    }

    /// Calls `f` on the record with the given key and returns the modified
    /// record, or `None` if no such record exists.
    pub(super) fn update(&mut self, key: Key, f: impl FnOnce(&mut T)) -> Option<T> {
        let idx = self.position(key)?;
        let record = &mut self.records[idx];
        f(record);
        Some(record.clone())
    }

    pub(super) fn remove(&mut self, key: Key) -> Option<T> {
        self.position(key).map(|idx| self.records.remove(idx))
    }
}


#[cfg(test)]
mod tests {
    use crate::model::{ClientPatch, NewClient};
    use super::*;

    fn new_client(name: &str) -> NewClient {
        NewClient {
            name: name.into(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".into(),
        }
    }

    #[test]
    fn keys_are_never_reused() {
        let store = MemoryStore::new();
        let a = store.clients(|c| c.insert(|key| Client::create(key, new_client("A"))));
        let b = store.clients(|c| c.insert(|key| Client::create(key, new_client("B"))));
        assert_eq!(a.key, Key(1));
        assert_eq!(b.key, Key(2));

        assert_eq!(store.clients(|c| c.remove(b.key)), Some(b));
        let c = store.clients(|c| c.insert(|key| Client::create(key, new_client("C"))));
        assert_eq!(c.key, Key(3));

        let names = store.clients(|c| c.all()).into_iter().map(|c| c.name).collect::<Vec<_>>();
        assert_eq!(names, ["A", "C"]);
    }

    #[test]
    fn missing_keys() {
        let store = MemoryStore::new();
        assert_eq!(store.clients(|c| c.get(Key(1))), None);
        assert_eq!(store.clients(|c| c.remove(Key(1))), None);
        assert_eq!(store.clients(|c| c.update(Key(1), |c| c.apply(ClientPatch::default()))), None);
    }

    #[test]
    fn continues_after_preloaded_records() {
        let existing = vec![
            Client::create(Key(7), new_client("Seven")),
            Client::create(Key(3), new_client("Three")),
        ];
        let store = MemoryStore::with_records(existing, vec![]);

        assert_eq!(store.clients(|c| c.all())[0].key, Key(3));
        let next = store.clients(|c| c.insert(|key| Client::create(key, new_client("Eight"))));
        assert_eq!(next.key, Key(8));
    }
}
