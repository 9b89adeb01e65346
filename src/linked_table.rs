//! LinkedTable: structural layer with a hashed index and insertion-order links.

use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

#[derive(Debug)]
struct Entry {
    key: Box<[u8]>,
    value: Box<[u8]>,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

/// Byte-keyed map storage with stable generational slots. Entries form a
/// doubly-linked chain in insertion order; overwriting a key replaces the
/// value in place and leaves the chain untouched.
pub(crate) struct LinkedTable {
    hasher: RandomState,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry>, // storage using generational keys
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
}

impl LinkedTable {
    pub(crate) fn new() -> Self {
        Self {
            hasher: RandomState::new(),
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn find_hashed(&self, key: &[u8], hash: u64) -> Option<DefaultKey> {
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| &*e.key == key)
                    .unwrap_or(false)
            })
            .copied()
    }

    pub(crate) fn find(&self, key: &[u8]) -> Option<DefaultKey> {
        self.find_hashed(key, self.hasher.hash_one(key))
    }

    pub(crate) fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let k = self.find(key)?;
        self.slots.get(k).map(|e| &*e.value)
    }

    /// Insert or overwrite. A fresh key is appended at the tail of the
    /// chain; an existing key gets its value replaced without moving.
    pub(crate) fn upsert(&mut self, key: &[u8], value: &[u8]) {
        let hash = self.hasher.hash_one(key);
        if let Some(k) = self.find_hashed(key, hash) {
            if let Some(e) = self.slots.get_mut(k) {
                e.value = value.into();
            }
            return;
        }

        let prev_tail = self.tail;
        let k = self.slots.insert(Entry {
            key: key.into(),
            value: value.into(),
            hash,
            prev: prev_tail,
            next: None,
        });
        self.index.insert_unique(hash, k, |&kk| {
            self.slots.get(kk).map(|e| e.hash).unwrap_or(0)
        });
        match prev_tail {
            Some(t) => {
                if let Some(e) = self.slots.get_mut(t) {
                    e.next = Some(k);
                }
            }
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Remove a key, unlinking it from the chain. Returns the stored value.
    pub(crate) fn remove(&mut self, key: &[u8]) -> Option<Box<[u8]>> {
        let hash = self.hasher.hash_one(key);
        let k = self.find_hashed(key, hash)?;
        let entry = self.slots.remove(k)?;

        // Unlink from index via occupied entry removal
        self.index
            .find_entry(entry.hash, |&kk| kk == k)
            .expect("index entry present for a live slot")
            .remove();

        match entry.prev {
            Some(p) => {
                if let Some(e) = self.slots.get_mut(p) {
                    e.next = entry.next;
                }
            }
            None => self.head = entry.next,
        }
        match entry.next {
            Some(n) => {
                if let Some(e) = self.slots.get_mut(n) {
                    e.prev = entry.prev;
                }
            }
            None => self.tail = entry.prev,
        }

        Some(entry.value)
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    /// First slot in insertion order.
    pub(crate) fn first(&self) -> Option<DefaultKey> {
        self.head
    }

    /// Successor of a slot in insertion order. `None` for the tail or for a
    /// slot that has been removed (generational keys make stale slots miss).
    pub(crate) fn next_of(&self, k: DefaultKey) -> Option<DefaultKey> {
        self.slots.get(k)?.next
    }

    pub(crate) fn key_at(&self, k: DefaultKey) -> Option<&[u8]> {
        self.slots.get(k).map(|e| &*e.key)
    }
}
