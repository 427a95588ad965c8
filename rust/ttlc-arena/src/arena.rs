// rust/ttlc-arena/src/arena.rs
// Multi-zone bump allocator with checkpoint/restore

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::error::{ArenaError, ArenaResult};
use crate::page::GuardedRegion;
use crate::stats::ArenaStats;

/// Smallest arena worth creating (one page)
pub const MIN_ARENA_SIZE: usize = 4096;
/// Largest arena: zone offsets must fit in 32 bits
pub const MAX_ARENA_SIZE: usize = 1 << 32;
/// Fixed zone table size
pub const MAX_ZONES: usize = 8;

const ALIGN: usize = 8;

bitflags! {
    /// Arena creation flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ArenaFlags: u32 {
        /// Page-align the backing region and make head/tail pages no-access
        const GUARD_PAGES = 1 << 0;
        /// Maintain the allocation counter block
        const STATS = 1 << 1;
    }
}

/// Zone identifier, dense from 0
pub type ZoneId = u32;

/// Captured allocation cursor: `(active_zone, zone.used)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    zone: ZoneId,
    cursor: usize,
}

impl Checkpoint {
    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

/// Handle to an allocated span. Plain integers, valid for the life of
/// the owning arena; no pointers cross component boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaRef {
    pub zone: ZoneId,
    pub offset: u32,
    pub len: u32,
}

enum Backing {
    Plain(Box<[u8]>),
    Guarded(GuardedRegion),
}

struct Zone {
    backing: Backing,
    used: usize,
}

impl Zone {
    fn size(&self) -> usize {
        match &self.backing {
            Backing::Plain(b) => b.len(),
            Backing::Guarded(g) => g.size(),
        }
    }

    fn bytes(&self) -> &[u8] {
        match &self.backing {
            Backing::Plain(b) => b,
            Backing::Guarded(g) => g.bytes(),
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match &mut self.backing {
            Backing::Plain(b) => b,
            Backing::Guarded(g) => g.bytes_mut(),
        }
    }
}

/// Multi-zone bump allocator.
///
/// Allocation is a cursor bump plus an alignment mask: amortized and
/// worst-case O(1). Out-of-space is reported to the caller and leaves
/// the arena unchanged; allocations never spill to another zone.
pub struct Arena {
    zones: ArrayVec<Zone, MAX_ZONES>,
    active: usize,
    flags: ArenaFlags,
    stats: ArenaStats,
}

impl Arena {
    /// Create an arena with one zone of `size` bytes.
    pub fn create(size: usize, flags: ArenaFlags) -> ArenaResult<Self> {
        if size < MIN_ARENA_SIZE {
            return Err(ArenaError::SizeBelowMinimum(size));
        }
        if size > MAX_ARENA_SIZE {
            return Err(ArenaError::SizeAboveMaximum(size));
        }

        let backing = if flags.contains(ArenaFlags::GUARD_PAGES) {
            Backing::Guarded(GuardedRegion::new(size)?)
        } else {
            Backing::Plain(vec![0u8; size].into_boxed_slice())
        };

        let mut zones = ArrayVec::new();
        zones.push(Zone { backing, used: 0 });

        Ok(Self {
            zones,
            active: 0,
            flags,
            stats: ArenaStats::default(),
        })
    }

    /// Allocate `n` bytes in the active zone, 8-byte aligned.
    #[inline]
    pub fn alloc(&mut self, n: usize) -> ArenaResult<ArenaRef> {
        let aligned = (n + ALIGN - 1) & !(ALIGN - 1);
        let zone = &mut self.zones[self.active];
        let remaining = zone.size() - zone.used;
        if aligned > remaining {
            return Err(ArenaError::Exhausted {
                zone: self.active as u32,
                requested: n,
                remaining,
            });
        }
        let offset = zone.used;
        zone.used += aligned;

        if self.flags.contains(ArenaFlags::STATS) {
            let used_now = self.used();
            self.stats.record(aligned, used_now);
        }

        Ok(ArenaRef {
            zone: self.active as ZoneId,
            offset: offset as u32,
            len: n as u32,
        })
    }

    /// Allocate and copy `data` in one step.
    pub fn alloc_bytes(&mut self, data: &[u8]) -> ArenaResult<ArenaRef> {
        let r = self.alloc(data.len())?;
        self.bytes_mut(r).copy_from_slice(data);
        Ok(r)
    }

    /// Append a caller-provided zone. The active zone is unchanged.
    pub fn add_zone(&mut self, memory: Vec<u8>) -> ArenaResult<ZoneId> {
        if self.zones.is_full() {
            return Err(ArenaError::TooManyZones);
        }
        if self.size() + memory.len() > MAX_ARENA_SIZE {
            return Err(ArenaError::SizeAboveMaximum(self.size() + memory.len()));
        }
        let id = self.zones.len() as ZoneId;
        self.zones.push(Zone {
            backing: Backing::Plain(memory.into_boxed_slice()),
            used: 0,
        });
        Ok(id)
    }

    /// Direct subsequent allocations at `zone`.
    pub fn switch_zone(&mut self, zone: ZoneId) -> ArenaResult<()> {
        if zone as usize >= self.zones.len() {
            return Err(ArenaError::InvalidZone(zone));
        }
        self.active = zone as usize;
        Ok(())
    }

    /// Capture `(active_zone, cursor)`.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            zone: self.active as ZoneId,
            cursor: self.zones[self.active].used,
        }
    }

    /// Truncate the captured zone back to the checkpoint cursor and
    /// re-activate it. Identifiers into the truncated span become
    /// invalid; callers must not hold them. Idempotent.
    pub fn restore(&mut self, c: Checkpoint) -> ArenaResult<()> {
        let zone = self
            .zones
            .get_mut(c.zone as usize)
            .ok_or(ArenaError::InvalidZone(c.zone))?;
        if c.cursor > zone.used {
            return Err(ArenaError::StaleCheckpoint {
                cursor: c.cursor,
                used: zone.used,
            });
        }
        zone.used = c.cursor;
        self.active = c.zone as usize;
        Ok(())
    }

    /// Check the structural invariants. Returns a distinct error per
    /// violated invariant.
    pub fn validate(&self) -> ArenaResult<()> {
        if self.active >= self.zones.len() {
            return Err(ArenaError::ActiveZoneOutOfRange);
        }
        let mut sum = 0usize;
        for (i, z) in self.zones.iter().enumerate() {
            if z.used > z.size() {
                return Err(ArenaError::ZoneCursorExceedsSize(i as u32));
            }
            sum += z.size();
        }
        if sum != self.size() {
            return Err(ArenaError::ZoneSumMismatch);
        }
        if self.used() > self.size() {
            return Err(ArenaError::UsedExceedsSize);
        }
        Ok(())
    }

    /// Read access to an allocated span.
    pub fn bytes(&self, r: ArenaRef) -> &[u8] {
        let zone = &self.zones[r.zone as usize];
        &zone.bytes()[r.offset as usize..r.offset as usize + r.len as usize]
    }

    /// Write access to an allocated span.
    pub fn bytes_mut(&mut self, r: ArenaRef) -> &mut [u8] {
        let zone = &mut self.zones[r.zone as usize];
        &mut zone.bytes_mut()[r.offset as usize..r.offset as usize + r.len as usize]
    }

    /// Bytes in use across all zones.
    pub fn used(&self) -> usize {
        self.zones.iter().map(|z| z.used).sum()
    }

    /// Total capacity across all zones.
    pub fn size(&self) -> usize {
        self.zones.iter().map(|z| z.size()).sum()
    }

    /// Remaining capacity of the active zone.
    pub fn remaining(&self) -> usize {
        let z = &self.zones[self.active];
        z.size() - z.used
    }

    pub fn active_zone(&self) -> ZoneId {
        self.active as ZoneId
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zone_used(&self, zone: ZoneId) -> ArenaResult<usize> {
        self.zones
            .get(zone as usize)
            .map(|z| z.used)
            .ok_or(ArenaError::InvalidZone(zone))
    }

    pub fn stats(&self) -> ArenaStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_bad_sizes() {
        let err = Arena::create(16, ArenaFlags::empty()).err().unwrap();
        assert_eq!(err, ArenaError::SizeBelowMinimum(16));
        let err = Arena::create(MAX_ARENA_SIZE + 1, ArenaFlags::empty()).err().unwrap();
        assert_eq!(err, ArenaError::SizeAboveMaximum(MAX_ARENA_SIZE + 1));
    }

    #[test]
    fn test_alloc_is_aligned() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::empty()).unwrap();
        let r1 = a.alloc(3).unwrap();
        let r2 = a.alloc(1).unwrap();
        assert_eq!(r1.offset % 8, 0);
        assert_eq!(r2.offset % 8, 0);
        assert_eq!(r2.offset, 8);
    }

    #[test]
    fn test_exhaustion_leaves_state_unchanged() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::empty()).unwrap();
        let before = a.used();
        let err = a.alloc(MIN_ARENA_SIZE + 8).unwrap_err();
        assert!(matches!(err, ArenaError::Exhausted { .. }));
        assert_eq!(a.used(), before);
        // A smaller allocation that fits still succeeds.
        assert!(a.alloc(64).is_ok());
    }

    #[test]
    fn test_checkpoint_restore_roundtrip() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::empty()).unwrap();
        a.alloc_bytes(b"stable").unwrap();
        let cp = a.checkpoint();
        let watermark = a.used();
        a.alloc_bytes(b"scratch-one").unwrap();
        a.alloc_bytes(b"scratch-two").unwrap();
        a.restore(cp).unwrap();
        assert_eq!(a.used(), watermark);
        // Re-allocating lands on the same offsets.
        let r = a.alloc(4).unwrap();
        assert_eq!(r.offset as usize, watermark);
        // Restoring again is idempotent.
        a.restore(cp).unwrap();
        assert_eq!(a.used(), watermark);
    }

    #[test]
    fn test_zones_do_not_spill() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::empty()).unwrap();
        let z1 = a.add_zone(vec![0u8; 4096]).unwrap();
        assert_eq!(z1, 1);
        // add_zone does not change the active zone.
        assert_eq!(a.active_zone(), 0);
        // Fill zone 0; the failure must not touch zone 1.
        while a.alloc(512).is_ok() {}
        assert_eq!(a.zone_used(z1).unwrap(), 0);
        a.switch_zone(z1).unwrap();
        assert!(a.alloc(512).is_ok());
    }

    #[test]
    fn test_too_many_zones() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::empty()).unwrap();
        for _ in 0..MAX_ZONES - 1 {
            a.add_zone(vec![0u8; 64]).unwrap();
        }
        assert_eq!(a.add_zone(vec![0u8; 64]), Err(ArenaError::TooManyZones));
    }

    #[test]
    fn test_validate_ok() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::empty()).unwrap();
        a.alloc(100).unwrap();
        a.add_zone(vec![0u8; 1024]).unwrap();
        assert!(a.validate().is_ok());
    }

    #[test]
    fn test_stats_block() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::STATS).unwrap();
        a.alloc(10).unwrap();
        a.alloc(20).unwrap();
        let s = a.stats();
        assert_eq!(s.alloc_calls, 2);
        assert_eq!(s.total_allocated, 16 + 24);
        assert_eq!(s.peak_used, 40);
    }

    #[cfg(unix)]
    #[test]
    fn test_guard_pages_usable() {
        let mut a = Arena::create(MIN_ARENA_SIZE, ArenaFlags::GUARD_PAGES).unwrap();
        let r = a.alloc_bytes(b"guarded").unwrap();
        assert_eq!(a.bytes(r), b"guarded");
    }
}
