//! Handle-parameterized primitives over heap-owned map state.
//!
//! This is the boundary the public `Map` consumes: one opaque `MapHandle`
//! per allocation, created by `new_handle` and released exactly once by
//! `destroy`, with every other primitive taking the handle as its first
//! argument. The allocation also carries the single per-handle iteration
//! cursor that `iter_init` resets and `iter_next` advances.
//!
//! All functions except `new_handle` are `unsafe`: the caller must pass a
//! handle obtained from `new_handle` on which `destroy` has not yet run,
//! and must not call into this module for the same handle reentrantly.

use crate::linked_table::LinkedTable;
use slotmap::DefaultKey;
use std::ptr::NonNull;

pub(crate) struct RawMap {
    table: LinkedTable,
    cursor: Option<DefaultKey>, // next slot to yield, None when exhausted
}

/// Opaque reference to one heap-owned `RawMap`. Copyable so it can be
/// passed by value like a foreign pointer; validity is the caller's
/// invariant, not the type's.
#[derive(Copy, Clone, Debug)]
pub(crate) struct MapHandle(NonNull<RawMap>);

/// Allocate fresh empty map state and leak it behind a handle. The only
/// way to release the allocation is `destroy`.
pub(crate) fn new_handle() -> MapHandle {
    let state = Box::new(RawMap {
        table: LinkedTable::new(),
        cursor: None,
    });
    MapHandle(NonNull::from(Box::leak(state)))
}

/// Safety: handle is live (see module docs). The returned borrow must not
/// outlive the handle, and callers must not hold two at once.
unsafe fn state<'a>(h: MapHandle) -> &'a mut RawMap {
    &mut *h.0.as_ptr()
}

/// Insert or overwrite-in-place.
///
/// Safety: handle is live.
pub(crate) unsafe fn put(h: MapHandle, key: &[u8], value: &[u8]) {
    state(h).table.upsert(key, value);
}

/// Remove a key; reports whether an entry was actually removed.
///
/// Safety: handle is live.
pub(crate) unsafe fn remove(h: MapHandle, key: &[u8]) -> bool {
    state(h).table.remove(key).is_some()
}

/// Look up a key, copying the value out. A miss is `None`, never a fault.
///
/// Safety: handle is live.
pub(crate) unsafe fn get(h: MapHandle, key: &[u8]) -> Option<Vec<u8>> {
    state(h).table.get(key).map(<[u8]>::to_vec)
}

/// Drop every entry; the handle stays valid. Also parks the cursor.
///
/// Safety: handle is live.
pub(crate) unsafe fn clear(h: MapHandle) {
    let s = state(h);
    s.table.clear();
    s.cursor = None;
}

/// Reset the per-handle cursor to before the first entry.
///
/// Safety: handle is live.
pub(crate) unsafe fn iter_init(h: MapHandle) {
    let s = state(h);
    s.cursor = s.table.first();
}

/// Yield the key under the cursor and advance it. Exhaustion is `None`;
/// once exhausted, stays `None` until the next `iter_init`. A cursor left
/// on a since-removed slot ends the walk (stale generational slots miss).
///
/// Safety: handle is live.
pub(crate) unsafe fn iter_next(h: MapHandle) -> Option<Vec<u8>> {
    let s = state(h);
    let k = s.cursor?;
    let key = match s.table.key_at(k) {
        Some(key) => key.to_vec(),
        None => {
            s.cursor = None;
            return None;
        }
    };
    s.cursor = s.table.next_of(k);
    Some(key)
}

/// Number of entries, off the structural counter (no traversal).
///
/// Safety: handle is live.
pub(crate) unsafe fn count(h: MapHandle) -> u64 {
    state(h).table.len() as u64
}

/// Release the allocation. The handle (and any copy of it) is dead
/// afterwards; no primitive may receive it again.
///
/// Safety: handle is live, and this is the last use of it.
pub(crate) unsafe fn destroy(h: MapHandle) {
    drop(Box::from_raw(h.0.as_ptr()));
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The primitive protocol end to end: create, mutate, walk, count,
    /// destroy. Exercised raw, the way `Map` drives it.
    #[test]
    fn primitive_protocol_round_trip() {
        let h = new_handle();
        unsafe {
            assert_eq!(count(h), 0);
            put(h, b"a", b"1");
            put(h, b"b", b"2");
            put(h, b"a", b"one"); // overwrite keeps position
            assert_eq!(count(h), 2);
            assert_eq!(get(h, b"a"), Some(b"one".to_vec()));
            assert_eq!(get(h, b"missing"), None);

            iter_init(h);
            assert_eq!(iter_next(h), Some(b"a".to_vec()));
            assert_eq!(iter_next(h), Some(b"b".to_vec()));
            assert_eq!(iter_next(h), None);
            assert_eq!(iter_next(h), None); // stays exhausted

            assert!(remove(h, b"a"));
            assert!(!remove(h, b"a"));
            assert_eq!(count(h), 1);

            clear(h);
            assert_eq!(count(h), 0);
            iter_init(h);
            assert_eq!(iter_next(h), None);

            destroy(h);
        }
    }

    /// `iter_init` restarts a pass from the first entry even when a prior
    /// pass was abandoned midway.
    #[test]
    fn iter_init_restarts_abandoned_pass() {
        let h = new_handle();
        unsafe {
            for k in [b"a", b"b", b"c"] {
                put(h, k, b"v");
            }
            iter_init(h);
            assert_eq!(iter_next(h), Some(b"a".to_vec()));

            iter_init(h);
            let mut keys = Vec::new();
            while let Some(k) = iter_next(h) {
                keys.push(k);
            }
            assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
            destroy(h);
        }
    }

    /// A cursor parked on a slot that gets removed terminates the walk
    /// instead of resolving a stale slot.
    #[test]
    fn cursor_on_removed_slot_ends_walk() {
        let h = new_handle();
        unsafe {
            put(h, b"a", b"1");
            put(h, b"b", b"2");
            iter_init(h); // cursor on "a"
            assert!(remove(h, b"a"));
            assert_eq!(iter_next(h), None);
            destroy(h);
        }
    }
}
