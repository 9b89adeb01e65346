//! Map: public surface owning exactly one raw handle.

use crate::error::{MapError, Result};
use crate::raw::{self, MapHandle};
use core::marker::PhantomData;
use indexmap::IndexMap;

/// An insertion-ordered map from byte-string keys to byte-string values,
/// held behind an explicitly managed handle.
///
/// The handle is exclusively owned: `Map` is not `Clone`, and the handle
/// never escapes. `free` releases it eagerly and turns every later
/// operation into `Err(MapError::UseAfterFree)`; if `free` was never
/// called, `Drop` releases it instead, so the underlying allocation is
/// destroyed exactly once either way.
///
/// Iteration (`cursor`, `keys`, `values`, `each`, `to_map`, `merge`) runs
/// over a single cursor scoped to the handle, so those operations take
/// `&mut self`: two interleaved passes over the same map cannot be
/// expressed. Each call restarts the cursor from the first entry.
///
/// `Map` is `!Send` and `!Sync`; cross-thread use requires an external
/// lock around an owning wrapper.
pub struct Map {
    handle: Option<MapHandle>, // None once freed
}

impl Map {
    /// Create an empty map with a freshly allocated handle. Allocation
    /// failure is fatal (global allocator), so there is no error path.
    pub fn new() -> Self {
        Self {
            handle: Some(raw::new_handle()),
        }
    }

    /// Build a map by inserting pairs in order. A key occurring twice
    /// keeps its first position and its last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let mut map = Self::new();
        for (k, v) in pairs {
            map.put(k, v)
                .expect("handle of a freshly created map is live");
        }
        map
    }

    /// Live handle, or the use-after-free fault. Every operation funnels
    /// through here first.
    fn handle(&self) -> Result<MapHandle> {
        self.handle.ok_or(MapError::UseAfterFree)
    }

    /// Release the handle. Further calls, including a second `free`,
    /// return `UseAfterFree`; only `Drop` stays a no-op afterwards.
    pub fn free(&mut self) -> Result<()> {
        let h = self.handle.take().ok_or(MapError::UseAfterFree)?;
        // Safety: handle was live and is unreachable from now on.
        unsafe { raw::destroy(h) };
        Ok(())
    }

    /// Insert or overwrite. Overwriting keeps the key's iteration
    /// position; a fresh key is appended at the end. Empty byte strings
    /// are valid keys and values.
    pub fn put(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        let h = self.handle()?;
        // Safety: handle checked live above; exclusive via &mut self.
        unsafe { raw::put(h, key.as_ref(), value.as_ref()) };
        Ok(())
    }

    /// Value bound to `key`, or `Ok(None)` on a miss. Misses are an
    /// expected outcome, never an error.
    pub fn get(&self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        let h = self.handle()?;
        // Safety: handle checked live above.
        Ok(unsafe { raw::get(h, key.as_ref()) })
    }

    /// Remove `key`, returning its prior value. An absent key is
    /// `Ok(None)` with no mutation. If removal fails for a key the lookup
    /// just found, that is a broken invariant between the two steps and
    /// surfaces as `RemovalFailure`.
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> Result<Option<Vec<u8>>> {
        let h = self.handle()?;
        let key = key.as_ref();
        // Safety (both calls): handle checked live above.
        let Some(prior) = (unsafe { raw::get(h, key) }) else {
            return Ok(None);
        };
        if !unsafe { raw::remove(h, key) } {
            return Err(MapError::RemovalFailure { key: key.to_vec() });
        }
        Ok(Some(prior))
    }

    /// Remove every entry. The handle stays valid and reusable.
    pub fn clear(&mut self) -> Result<()> {
        let h = self.handle()?;
        // Safety: handle checked live above.
        unsafe { raw::clear(h) };
        Ok(())
    }

    /// Entry count, off the native counter (no traversal).
    pub fn len(&self) -> Result<u64> {
        let h = self.handle()?;
        // Safety: handle checked live above.
        Ok(unsafe { raw::count(h) })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Start a key walk in insertion order. This resets the single cursor
    /// scoped to the handle; the exclusive borrow keeps a second pass or a
    /// mutation from interleaving with it.
    pub fn cursor(&mut self) -> Result<Cursor<'_>> {
        let h = self.handle()?;
        // Safety: handle checked live above; &mut self for the cursor reset.
        unsafe { raw::iter_init(h) };
        Ok(Cursor {
            handle: h,
            _map: PhantomData,
        })
    }

    /// All keys in insertion order, fully materialized in one pass.
    pub fn keys(&mut self) -> Result<Vec<Vec<u8>>> {
        Ok(self.cursor()?.collect())
    }

    /// All values, in the same order as `keys`. Derived by looking each
    /// key back up after the key pass; keys are stable while nothing
    /// mutates, so every lookup hits.
    pub fn values(&mut self) -> Result<Vec<Vec<u8>>> {
        let keys = self.keys()?;
        let mut values = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(v) = self.get(&key)? {
                values.push(v);
            }
        }
        Ok(values)
    }

    /// Visit every entry in insertion order. Keys are collected before the
    /// first visit, so `visit` never observes a live cursor.
    pub fn each(&mut self, mut visit: impl FnMut(&[u8], &[u8])) -> Result<()> {
        for key in self.keys()? {
            if let Some(value) = self.get(&key)? {
                visit(&key, &value);
            }
        }
        Ok(())
    }

    /// Snapshot of the contents as an insertion-ordered generic mapping.
    pub fn to_map(&mut self) -> Result<IndexMap<Vec<u8>, Vec<u8>>> {
        let keys = self.keys()?;
        let mut out = IndexMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.get(&key)? {
                out.insert(key, value);
            }
        }
        Ok(out)
    }

    /// `to_map` with `other` applied on top. Does not mutate the map.
    pub fn merge<I, K, V>(&mut self, other: I) -> Result<IndexMap<Vec<u8>, Vec<u8>>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Vec<u8>>,
        V: Into<Vec<u8>>,
    {
        let mut out = self.to_map()?;
        for (k, v) in other {
            out.insert(k.into(), v.into());
        }
        Ok(out)
    }

    /// Apply `other`'s entries to the map in `other`'s order, one `put`
    /// per pair; the last writer for a duplicated key wins.
    pub fn merge_into<I, K, V>(&mut self, other: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        for (k, v) in other {
            self.put(k, v)?;
        }
        Ok(())
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Map {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            // Safety: handle still live (free was never called) and this
            // is its last use.
            unsafe { raw::destroy(h) };
        }
    }
}

/// Key iterator in insertion order, driving the per-handle cursor. Holds
/// an exclusive borrow of its `Map` for its whole lifetime, so nothing can
/// reset the cursor or mutate the map mid-pass.
pub struct Cursor<'a> {
    handle: MapHandle,
    _map: PhantomData<&'a mut Map>,
}

impl Iterator for Cursor<'_> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        // Safety: the borrow in _map pins the owning Map, so the handle it
        // checked live at cursor creation is still live.
        unsafe { raw::iter_next(self.handle) }
    }
}

// iter_next keeps returning None once the cursor is exhausted.
impl core::iter::FusedIterator for Cursor<'_> {}
