//! Index freshness checking.

use anyhow::Result;

use crate::record::RecordKind;
use crate::store::{now_unix, RecordStore};

/// Seconds after the last completed pass at which the index counts as stale.
pub const STALE_THRESHOLD_SECS: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessStatus {
    is_stale: bool,
    /// None if no pass has completed
    seconds_since_update: Option<i64>,
    file_count: usize,
}

impl FreshnessStatus {
    pub fn new(is_stale: bool, seconds_since_update: Option<i64>, file_count: usize) -> Self {
        Self {
            is_stale,
            seconds_since_update,
            file_count,
        }
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale
    }

    pub fn seconds_since_update(&self) -> Option<i64> {
        self.seconds_since_update
    }

    pub fn minutes_since_update(&self) -> Option<i64> {
        self.seconds_since_update.map(|s| s / 60)
    }

    pub fn file_count(&self) -> usize {
        self.file_count
    }

    pub fn warning_message(&self) -> Option<String> {
        if !self.is_stale {
            return None;
        }
        Some(match self.minutes_since_update() {
            Some(mins) => format!(
                "WARNING: index may be stale (last completed pass {} minutes ago)\n  Run 'symdex build' to refresh",
                mins
            ),
            None => "WARNING: index has never completed a pass\n  Run 'symdex build' to create it"
                .to_string(),
        })
    }
}

/// Check how long ago the store's last completed pass was.
///
/// An empty store is not stale. A store holding files but no completed
/// pass (for example after a cancelled build) is.
pub fn check_freshness(store: &dyn RecordStore) -> Result<FreshnessStatus> {
    let file_count = store.count(RecordKind::File)?;
    if file_count == 0 {
        return Ok(FreshnessStatus::new(false, None, 0));
    }

    let status = match store.last_update()? {
        Some(ts) => {
            let seconds = now_unix().saturating_sub(ts);
            FreshnessStatus::new(seconds >= STALE_THRESHOLD_SECS, Some(seconds), file_count)
        }
        None => FreshnessStatus::new(true, None, file_count),
    };
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FileRecord, Record};
    use crate::store::InMemoryStore;

    #[test]
    fn test_empty_store_is_not_stale() {
        let store = InMemoryStore::new();
        let status = check_freshness(&store).unwrap();
        assert!(!status.is_stale());
        assert_eq!(status.file_count(), 0);
        assert!(status.warning_message().is_none());
    }

    #[test]
    fn test_files_without_completed_pass_are_stale() {
        let store = InMemoryStore::new();
        store
            .write(&Record::File(FileRecord::new("/a.ts".to_string())))
            .unwrap();

        let status = check_freshness(&store).unwrap();
        assert!(status.is_stale());
        assert!(status.warning_message().unwrap().contains("never completed"));
    }

    #[test]
    fn test_recent_pass_is_fresh() {
        let store = InMemoryStore::new();
        store
            .write(&Record::File(FileRecord::new("/a.ts".to_string())))
            .unwrap();
        store.update_timestamp().unwrap();

        let status = check_freshness(&store).unwrap();
        assert!(!status.is_stale());
        assert!(status.seconds_since_update().unwrap() < STALE_THRESHOLD_SECS);
    }

    #[test]
    fn test_minutes_since_update() {
        let status = FreshnessStatus::new(true, Some(600), 10);
        assert_eq!(status.minutes_since_update(), Some(10));
        assert!(status.warning_message().unwrap().contains("10 minutes"));
    }
}
