// rust/ttlc-arena/src/shared.rs
// Optional mutex wrapper around Arena

use parking_lot::Mutex;

use crate::arena::{Arena, ArenaRef, Checkpoint, ZoneId};
use crate::error::ArenaResult;

/// Mutex-wrapped arena for callers that need cross-thread handoff.
///
/// Lock acquisition is not counted against the per-operation cycle
/// budget; contention is the caller's problem.
pub struct SharedArena {
    inner: Mutex<Arena>,
}

impl SharedArena {
    pub fn new(arena: Arena) -> Self {
        Self {
            inner: Mutex::new(arena),
        }
    }

    pub fn alloc(&self, n: usize) -> ArenaResult<ArenaRef> {
        self.inner.lock().alloc(n)
    }

    pub fn alloc_bytes(&self, data: &[u8]) -> ArenaResult<ArenaRef> {
        self.inner.lock().alloc_bytes(data)
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.inner.lock().checkpoint()
    }

    pub fn restore(&self, c: Checkpoint) -> ArenaResult<()> {
        self.inner.lock().restore(c)
    }

    pub fn switch_zone(&self, zone: ZoneId) -> ArenaResult<()> {
        self.inner.lock().switch_zone(zone)
    }

    /// Run `f` with exclusive access to the arena.
    pub fn with<T>(&self, f: impl FnOnce(&mut Arena) -> T) -> T {
        f(&mut self.inner.lock())
    }

    pub fn into_inner(self) -> Arena {
        self.inner.into_inner()
    }
}
