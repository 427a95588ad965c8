// rust/ttlc-arena/src/lib.rs
// Zone arena allocator with checkpoint/restore
// Every compiler stage owns one arena; identifiers into it are plain integers

mod arena;
mod error;
mod page;
mod shared;
mod stats;

pub use arena::{Arena, ArenaFlags, ArenaRef, Checkpoint, ZoneId, MAX_ARENA_SIZE, MAX_ZONES, MIN_ARENA_SIZE};
pub use error::{ArenaError, ArenaResult};
pub use shared::SharedArena;
pub use stats::ArenaStats;
