//! Blocklist Store Port
//!
//! Defines the interface for the concurrency-safe authority over permanent
//! blocks, temporal blocks, and attempt logs.

use crate::domain::entities::{BlockedAttempt, BlockedCountry, BlockedCountryDetails, TemporalBlock};
use crate::domain::value_objects::CountryCode;

/// Conflict raised when adding a temporal block for a country that already
/// has a block of either kind.
///
/// Reported as a normal return value, never a panic: the caller decides the
/// user-facing response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockConflict {
    #[error("country {0} is already permanently blocked")]
    AlreadyPermanent(CountryCode),
    #[error("country {0} is already temporally blocked")]
    AlreadyTemporal(CountryCode),
}

/// Store for country block records and attempt logs.
///
/// Implementations must support many concurrent readers and writers. A
/// country code must never hold a permanent and a temporal block at the
/// same time; adding a permanent block evicts any temporal one for the
/// same code in a single atomic step.
///
/// All operations are in-memory structural updates; none performs I/O, so
/// the trait is synchronous.
pub trait BlockedStore: Send + Sync {
    /// Add a permanent block.
    ///
    /// Returns true iff no permanent block existed for `code`; on success
    /// any temporal block for the same code is removed atomically. Returns
    /// false (without touching the existing entry) if already permanently
    /// blocked.
    fn add_permanent(&self, code: CountryCode, name: String) -> bool;

    /// Remove whichever block exists for `code`.
    ///
    /// Returns true iff an entry was removed.
    fn remove_blocked(&self, code: &CountryCode) -> bool;

    /// Snapshot of the current permanent blocks; order not significant.
    fn all_permanent(&self) -> Vec<BlockedCountry>;

    /// Add a temporal block expiring `duration_minutes` from now.
    ///
    /// Zero or negative durations are accepted and yield an entry that is
    /// already expired. Returns the created block so callers can report
    /// its expiry.
    fn add_temporal(
        &self,
        code: CountryCode,
        name: String,
        duration_minutes: i64,
    ) -> Result<TemporalBlock, BlockConflict>;

    /// Union of all permanent blocks and all temporal blocks whose expiry
    /// is strictly in the future at evaluation time.
    fn currently_blocked(&self) -> Vec<BlockedCountryDetails>;

    /// Remove every temporal block whose expiry is at or before now.
    ///
    /// Idempotent; safe to call concurrently with reads and additions.
    /// Returns how many entries were removed.
    fn remove_expired_temporal(&self) -> usize;

    /// Whether `code` has a live permanent or unexpired temporal block.
    ///
    /// Liveness is computed against the current time, independent of sweep
    /// cadence: an expired-but-unswept temporal entry reads as not blocked.
    fn is_blocked(&self, code: &CountryCode) -> bool;

    /// Append an attempt record. Never fails.
    fn log(&self, attempt: BlockedAttempt);

    /// Snapshot of the attempt log in insertion order.
    fn logs(&self) -> Vec<BlockedAttempt>;
}
