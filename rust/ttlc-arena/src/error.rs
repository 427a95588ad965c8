// rust/ttlc-arena/src/error.rs
// Arena error types, one variant per failure mode

/// Errors reported by arena operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    #[error("arena size {0} below minimum {min}", min = crate::MIN_ARENA_SIZE)]
    SizeBelowMinimum(usize),
    #[error("arena size {0} above maximum {max}", max = crate::MAX_ARENA_SIZE)]
    SizeAboveMaximum(usize),
    #[error("zone {zone} exhausted: {requested} bytes requested, {remaining} remaining")]
    Exhausted {
        zone: u32,
        requested: usize,
        remaining: usize,
    },
    #[error("zone limit reached: at most {max} zones", max = crate::MAX_ZONES)]
    TooManyZones,
    #[error("zone id {0} out of range")]
    InvalidZone(u32),
    #[error("checkpoint cursor {cursor} ahead of zone cursor {used}")]
    StaleCheckpoint { cursor: usize, used: usize },
    #[error("guard pages unsupported on this platform")]
    GuardUnsupported,
    #[error("page protection failed: {0}")]
    GuardProtect(i32),
    // Distinct validate() codes, one per invariant
    #[error("invariant violated: used exceeds size")]
    UsedExceedsSize,
    #[error("invariant violated: zone {0} cursor exceeds zone size")]
    ZoneCursorExceedsSize(u32),
    #[error("invariant violated: zone sizes do not sum to arena size")]
    ZoneSumMismatch,
    #[error("invariant violated: active zone out of range")]
    ActiveZoneOutOfRange,
}

pub type ArenaResult<T> = Result<T, ArenaError>;
