//! stagemap: a single-threaded, insertion-ordered, byte-string-keyed map
//! held behind an explicitly managed handle, for staging changes
//! in-process before they are flushed elsewhere.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the resource-lifetime and iteration contract around one
//!   heap-owned map auditable by building it in small layers.
//! - Layers:
//!   - LinkedTable: structural map over stable generational slots with a
//!     hashed index and intrusive insertion-order links; overwrites are
//!     in-place, fresh keys append at the tail.
//!   - raw: handle-parameterized primitives (`new_handle`, `put`,
//!     `remove`, `get`, `clear`, `iter_init`, `iter_next`, `count`,
//!     `destroy`) over a leaked allocation, plus the single per-handle
//!     iteration cursor. `unsafe` lives here and nowhere else.
//!   - Map: public API owning at most one handle; `free`/`Drop` release
//!     it exactly once, and every post-free call fails with
//!     `MapError::UseAfterFree`.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (raw handle inside).
//! - One handle per `Map`, never aliased: `Map` is not `Clone` and the
//!   handle never escapes the crate, so `destroy` runs exactly once.
//! - Lookup misses are `Ok(None)` everywhere, never an error.
//! - One cursor per handle: every iterating operation takes `&mut self`,
//!   so interleaved passes are unrepresentable rather than detected.
//!
//! Why this split?
//! - Localize invariants: order linking is LinkedTable's problem, handle
//!   validity is `Map`'s, and the pointer juggling between them is
//!   confined to `raw`.
//! - Clear failure boundaries: the only fault classes that escape are
//!   `UseAfterFree` and `RemovalFailure`; everything else is an expected
//!   optional result.
//!
//! Conversion surface
//! - `from_pairs`, `to_map`, `merge`, and `merge_into` bridge to
//!   `indexmap::IndexMap`, the insertion-ordered generic mapping, with
//!   first-occurrence position and last-writer-wins value semantics.

mod error;
mod linked_table;
mod map;
mod map_proptest;
mod raw;

// Public surface
pub use error::{MapError, Result};
pub use map::{Cursor, Map};
