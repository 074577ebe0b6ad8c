//! DashMap Blocklist Store
//!
//! Implements BlockedStore using DashMap for lock-free concurrent access.

use crate::domain::entities::{BlockedAttempt, BlockedCountry, BlockedCountryDetails, TemporalBlock};
use crate::domain::ports::{BlockConflict, BlockedStore};
use crate::domain::value_objects::CountryCode;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;

/// Block record held for a country code.
///
/// One tagged value per code makes it impossible for a country to hold a
/// permanent and a temporal block at the same time.
#[derive(Debug, Clone)]
enum BlockEntry {
    Permanent {
        name: String,
    },
    Temporal {
        name: String,
        expires_at: DateTime<Utc>,
    },
}

/// DashMap-backed blocklist store.
///
/// Block records live in a single map keyed by normalized country code, so
/// every mutation is atomic per key: adding a permanent block replaces a
/// temporal one under the same entry lock, and no reader can observe both.
/// Attempt logs go to a lock-guarded append-only buffer.
pub struct DashMapBlockedStore {
    entries: DashMap<CountryCode, BlockEntry>,
    attempts: RwLock<Vec<BlockedAttempt>>,
}

impl DashMapBlockedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            attempts: RwLock::new(Vec::new()),
        }
    }
}

impl Default for DashMapBlockedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockedStore for DashMapBlockedStore {
    fn add_permanent(&self, code: CountryCode, name: String) -> bool {
        match self.entries.entry(code) {
            Entry::Occupied(mut entry) => match entry.get() {
                BlockEntry::Permanent { .. } => false,
                // Permanent takes precedence: evict the temporal block
                BlockEntry::Temporal { .. } => {
                    entry.insert(BlockEntry::Permanent { name });
                    true
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(BlockEntry::Permanent { name });
                true
            }
        }
    }

    fn remove_blocked(&self, code: &CountryCode) -> bool {
        self.entries.remove(code).is_some()
    }

    fn all_permanent(&self) -> Vec<BlockedCountry> {
        self.entries
            .iter()
            .filter_map(|entry| match entry.value() {
                BlockEntry::Permanent { name } => {
                    Some(BlockedCountry::new(entry.key().clone(), name.clone()))
                }
                BlockEntry::Temporal { .. } => None,
            })
            .collect()
    }

    fn add_temporal(
        &self,
        code: CountryCode,
        name: String,
        duration_minutes: i64,
    ) -> Result<TemporalBlock, BlockConflict> {
        match self.entries.entry(code.clone()) {
            Entry::Occupied(entry) => match entry.get() {
                BlockEntry::Permanent { .. } => Err(BlockConflict::AlreadyPermanent(code)),
                BlockEntry::Temporal { .. } => Err(BlockConflict::AlreadyTemporal(code)),
            },
            Entry::Vacant(entry) => {
                let block = TemporalBlock::new(code, name, duration_minutes);
                entry.insert(BlockEntry::Temporal {
                    name: block.name.clone(),
                    expires_at: block.expires_at,
                });
                Ok(block)
            }
        }
    }

    fn currently_blocked(&self) -> Vec<BlockedCountryDetails> {
        let now = Utc::now();
        self.entries
            .iter()
            .filter_map(|entry| match entry.value() {
                BlockEntry::Permanent { name } => Some(BlockedCountryDetails {
                    code: entry.key().clone(),
                    name: name.clone(),
                    is_temporary: false,
                    remaining_minutes: None,
                }),
                BlockEntry::Temporal { name, expires_at } if *expires_at > now => {
                    let ms = (*expires_at - now).num_milliseconds();
                    Some(BlockedCountryDetails {
                        code: entry.key().clone(),
                        name: name.clone(),
                        is_temporary: true,
                        remaining_minutes: Some(((ms + 59_999) / 60_000).max(1)),
                    })
                }
                BlockEntry::Temporal { .. } => None,
            })
            .collect()
    }

    fn remove_expired_temporal(&self) -> usize {
        let now = Utc::now();
        let expired: Vec<CountryCode> = self
            .entries
            .iter()
            .filter(|entry| {
                matches!(entry.value(), BlockEntry::Temporal { expires_at, .. } if *expires_at <= now)
            })
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for code in expired {
            // Re-check under the entry lock: the code may have been
            // re-blocked permanently since the scan
            let gone = self
                .entries
                .remove_if(&code, |_, value| {
                    matches!(value, BlockEntry::Temporal { expires_at, .. } if *expires_at <= now)
                })
                .is_some();
            if gone {
                removed += 1;
            }
        }
        removed
    }

    fn is_blocked(&self, code: &CountryCode) -> bool {
        self.entries.get(code).is_some_and(|entry| match entry.value() {
            BlockEntry::Permanent { .. } => true,
            BlockEntry::Temporal { expires_at, .. } => *expires_at > Utc::now(),
        })
    }

    fn log(&self, attempt: BlockedAttempt) {
        self.attempts.write().push(attempt);
    }

    fn logs(&self) -> Vec<BlockedAttempt> {
        self.attempts.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn code(s: &str) -> CountryCode {
        CountryCode::parse(s).unwrap()
    }

    fn attempt(ip: &str, country: &str, blocked: bool) -> BlockedAttempt {
        BlockedAttempt {
            ip: ip.to_string(),
            timestamp: Utc::now(),
            country_code: country.to_string(),
            blocked,
            user_agent: "test-agent".to_string(),
        }
    }

    // ===== Permanent Block Tests =====

    #[test]
    fn test_add_permanent() {
        let store = DashMapBlockedStore::new();

        assert!(store.add_permanent(code("US"), "United States".to_string()));
        assert!(store.is_blocked(&code("US")));
    }

    #[test]
    fn test_add_permanent_duplicate_rejected() {
        let store = DashMapBlockedStore::new();

        assert!(store.add_permanent(code("US"), "United States".to_string()));
        assert!(!store.add_permanent(code("US"), "Renamed".to_string()));

        // The original entry is untouched
        let permanent = store.all_permanent();
        assert_eq!(permanent.len(), 1);
        assert_eq!(permanent[0].name, "United States");
    }

    #[test]
    fn test_add_permanent_is_case_insensitive() {
        let store = DashMapBlockedStore::new();

        assert!(store.add_permanent(code("us"), "United States".to_string()));
        assert!(!store.add_permanent(code("US"), "United States".to_string()));
        assert!(store.is_blocked(&code("uS")));
    }

    #[test]
    fn test_add_permanent_evicts_temporal() {
        let store = DashMapBlockedStore::new();

        store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();
        assert!(store.add_permanent(code("EG"), "Egypt".to_string()));

        // Only the permanent entry remains
        let details = store.currently_blocked();
        assert_eq!(details.len(), 1);
        assert!(!details[0].is_temporary);
        assert_eq!(store.all_permanent().len(), 1);
    }

    // ===== Temporal Block Tests =====

    #[test]
    fn test_add_temporal() {
        let store = DashMapBlockedStore::new();

        let block = store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();

        assert_eq!(block.code.as_str(), "EG");
        assert!(block.expires_at > Utc::now());
        assert!(store.is_blocked(&code("EG")));
    }

    #[test]
    fn test_add_temporal_conflicts_with_permanent() {
        let store = DashMapBlockedStore::new();
        store.add_permanent(code("US"), "United States".to_string());

        let err = store
            .add_temporal(code("US"), "United States".to_string(), 60)
            .unwrap_err();

        assert_eq!(err, BlockConflict::AlreadyPermanent(code("US")));
        assert!(err.to_string().contains("permanently blocked"));
    }

    #[test]
    fn test_add_temporal_conflicts_with_temporal() {
        let store = DashMapBlockedStore::new();
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();

        let err = store
            .add_temporal(code("EG"), "Egypt".to_string(), 30)
            .unwrap_err();

        assert_eq!(err, BlockConflict::AlreadyTemporal(code("EG")));
        assert!(err.to_string().contains("temporally blocked"));
    }

    #[test]
    fn test_temporal_not_in_permanent_snapshot() {
        let store = DashMapBlockedStore::new();
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();

        assert!(store.all_permanent().is_empty());
    }

    // ===== Remove Tests =====

    #[test]
    fn test_remove_untouched_code_returns_false() {
        let store = DashMapBlockedStore::new();
        assert!(!store.remove_blocked(&code("XX")));
    }

    #[test]
    fn test_remove_permanent() {
        let store = DashMapBlockedStore::new();
        store.add_permanent(code("US"), "United States".to_string());

        assert!(store.remove_blocked(&code("US")));
        assert!(!store.is_blocked(&code("US")));
    }

    #[test]
    fn test_remove_temporal() {
        let store = DashMapBlockedStore::new();
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();

        assert!(store.remove_blocked(&code("eg")));
        assert!(!store.is_blocked(&code("EG")));
    }

    // ===== Expiry Tests =====

    #[test]
    fn test_expired_entry_not_blocked_before_sweep() {
        let store = DashMapBlockedStore::new();
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 0)
            .unwrap();

        // Inline expiry: the unswept entry already reads as unblocked
        assert!(!store.is_blocked(&code("EG")));
        assert!(store.currently_blocked().is_empty());
    }

    #[test]
    fn test_sweep_removes_expired() {
        let store = DashMapBlockedStore::new();
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 0)
            .unwrap();

        assert_eq!(store.remove_expired_temporal(), 1);
        assert!(!store.is_blocked(&code("EG")));
        assert!(store.currently_blocked().is_empty());

        // A fresh temporal block for the same code is accepted again
        assert!(store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .is_ok());
    }

    #[test]
    fn test_sweep_keeps_active_and_permanent() {
        let store = DashMapBlockedStore::new();
        store.add_permanent(code("US"), "United States".to_string());
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();
        store
            .add_temporal(code("JP"), "Japan".to_string(), -1)
            .unwrap();

        assert_eq!(store.remove_expired_temporal(), 1);
        assert!(store.is_blocked(&code("US")));
        assert!(store.is_blocked(&code("EG")));
        assert!(!store.is_blocked(&code("JP")));
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let store = DashMapBlockedStore::new();
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 0)
            .unwrap();

        assert_eq!(store.remove_expired_temporal(), 1);
        assert_eq!(store.remove_expired_temporal(), 0);
    }

    // ===== Details View Tests =====

    #[test]
    fn test_currently_blocked_merges_permanent_and_temporal() {
        let store = DashMapBlockedStore::new();
        store.add_permanent(code("US"), "United States".to_string());
        store.add_permanent(code("GB"), "United Kingdom".to_string());
        store
            .add_temporal(code("EG"), "Egypt".to_string(), 60)
            .unwrap();
        store
            .add_temporal(code("JP"), "Japan".to_string(), 60)
            .unwrap();

        let details = store.currently_blocked();
        assert_eq!(details.len(), 4);

        let us = details.iter().find(|d| d.code.as_str() == "US").unwrap();
        assert!(!us.is_temporary);
        assert!(us.remaining_minutes.is_none());

        let eg = details.iter().find(|d| d.code.as_str() == "EG").unwrap();
        assert!(eg.is_temporary);
        let remaining = eg.remaining_minutes.unwrap();
        assert!((59..=60).contains(&remaining), "got {}", remaining);
    }

    // ===== Log Tests =====

    #[test]
    fn test_log_appends_in_order() {
        let store = DashMapBlockedStore::new();

        store.log(attempt("1.1.1.1", "AU", false));
        store.log(attempt("8.8.8.8", "US", true));

        let logs = store.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].ip, "1.1.1.1");
        assert_eq!(logs[1].ip, "8.8.8.8");
    }

    #[test]
    fn test_logs_snapshot_is_independent() {
        let store = DashMapBlockedStore::new();
        store.log(attempt("1.1.1.1", "AU", false));

        let snapshot = store.logs();
        store.log(attempt("8.8.8.8", "US", true));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.logs().len(), 2);
    }

    // ===== Concurrency Tests =====

    #[test]
    fn test_concurrent_permanent_vs_temporal_invariant() {
        let store = Arc::new(DashMapBlockedStore::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..100 {
                    if i % 2 == 0 {
                        store.add_permanent(code("EG"), "Egypt".to_string());
                        store.remove_blocked(&code("EG"));
                    } else {
                        let _ = store.add_temporal(code("EG"), "Egypt".to_string(), 60);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Never both kinds for one code: at most one entry can exist, and
        // the permanent and temporal views cannot overlap
        let permanent = store.all_permanent();
        let details = store.currently_blocked();
        assert!(details.len() <= 1);
        if let Some(d) = details.first() {
            assert_eq!(d.is_temporary, permanent.is_empty());
        }
    }

    #[test]
    fn test_concurrent_log_appends() {
        let store = Arc::new(DashMapBlockedStore::new());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..250 {
                    store.log(attempt("1.2.3.4", "US", false));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.logs().len(), 1000);
    }
}
