use chrono::Utc;
use log::{error, info, warn};

use crate::models::itinerary::{FeedbackEntry, ItineraryRecord, NewItinerary};
use crate::models::stats::StatsSnapshot;
use crate::services::storage::interface::{RecordStore, StorageError};
use crate::services::storage::json_store::JsonStore;
use crate::services::storage::postgres_store::PostgresStore;

/// Dual-write coordinator: a primary relational backend (optional) wrapped
/// around the always-present flat-file backup. This is the sole writer of
/// record state, and the one place that decides which storage failures are
/// absorbed and which propagate.
///
/// The two backends are kept eventually, not transactionally, consistent: a
/// crash between the primary and backup writes leaves them divergent, and
/// ids are assigned independently when the primary is down.
pub struct DualStorage {
    primary: Option<PostgresStore>,
    backup: JsonStore,
}

impl DualStorage {
    pub fn new(primary: Option<PostgresStore>, backup: JsonStore) -> Self {
        match primary {
            Some(_) => info!("Dual storage initialized: PostgreSQL + JSON backup"),
            None => info!("Using JSON storage only"),
        }
        Self { primary, backup }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Attempts the primary write, then unconditionally writes the backup.
    /// When the primary produced an id the backup reuses it; otherwise the
    /// backup assigns its own. Primary failure never blocks the backup.
    pub async fn store_itinerary(&self, itinerary: NewItinerary) -> i64 {
        let mut primary_id = None;
        if let Some(primary) = &self.primary {
            match primary.create_itinerary(itinerary.clone(), None).await {
                Ok(id) => {
                    info!("Stored itinerary #{} in PostgreSQL", id);
                    primary_id = Some(id);
                }
                Err(err) => error!("PostgreSQL storage failed: {}", err),
            }
        }

        match self.backup.create_itinerary(itinerary, primary_id).await {
            Ok(id) => {
                info!("Itinerary #{} backed up to JSON", id);
                id
            }
            Err(err) => {
                // Persisted state is now stale; the caller still gets an id
                // so the generated plan can be displayed.
                error!("JSON backup failed: {}", err);
                primary_id.unwrap_or(0)
            }
        }
    }

    /// Records feedback in both backends and appends to the append-only
    /// feedback log. The rating is clamped into 1..=5 here, once, before
    /// either backend sees it; comments arrive pre-sanitized. Returns the
    /// feedback-log length, which drives the auto-train trigger; storage
    /// errors are logged, never surfaced.
    pub async fn record_feedback(&self, itinerary_id: i64, rating: i64, comments: &str) -> usize {
        let rating = rating.clamp(1, 5) as u8;

        if let Some(primary) = &self.primary {
            if let Err(err) = primary.record_feedback(itinerary_id, rating, comments).await {
                error!("PostgreSQL feedback failed: {}", err);
            }
        }

        if let Err(err) = self.backup.record_feedback(itinerary_id, rating, comments).await {
            error!("JSON feedback update failed: {}", err);
        }

        match self.backup.append_feedback(FeedbackEntry {
            timestamp: Utc::now(),
            itinerary_id,
            rating,
            comments: comments.to_string(),
        }) {
            Ok(count) => {
                info!("Feedback recorded for itinerary #{}: {} stars", itinerary_id, rating);
                count
            }
            Err(err) => {
                error!("Feedback log append failed: {}", err);
                0
            }
        }
    }

    /// Newest-first listing, preferring the primary and falling back to the
    /// backup on any primary failure.
    pub async fn get_recent(&self, limit: usize) -> Result<Vec<ItineraryRecord>, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.list_recent(limit).await {
                Ok(records) => return Ok(records),
                Err(err) => warn!("Primary read failed, falling back to JSON: {}", err),
            }
        }
        self.backup.list_recent(limit).await
    }

    /// Full scan with the same primary-then-backup fallback.
    pub async fn load_all(&self) -> Result<Vec<ItineraryRecord>, StorageError> {
        if let Some(primary) = &self.primary {
            match primary.load_all().await {
                Ok(records) => return Ok(records),
                Err(err) => warn!("Primary read failed, falling back to JSON: {}", err),
            }
        }
        self.backup.load_all().await
    }

    /// Aggregate snapshot from the primary's metrics row, or None when the
    /// primary is absent or unreachable (the caller then scans the backup).
    pub async fn statistics_from_primary(&self) -> Option<StatsSnapshot> {
        let primary = self.primary.as_ref()?;
        match primary.statistics().await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!("Primary statistics failed, falling back to JSON: {}", err);
                None
            }
        }
    }

    /// Stamps training usage on both backends, backup unconditionally.
    pub async fn mark_trained(&self, ids: &[i64], iteration: u32) {
        if let Some(primary) = &self.primary {
            if let Err(err) = primary.mark_trained(ids, iteration).await {
                error!("PostgreSQL training mark failed: {}", err);
            }
        }
        if let Err(err) = self.backup.mark_trained(ids, iteration).await {
            error!("JSON training mark failed: {}", err);
        }
    }

    pub fn feedback_count(&self) -> usize {
        self.backup.feedback_count().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::BudgetTier;
    use tempfile::TempDir;

    fn json_only(dir: &TempDir) -> DualStorage {
        DualStorage::new(None, JsonStore::new(dir.path()).unwrap())
    }

    fn sample(destination: &str) -> NewItinerary {
        NewItinerary::new(
            destination.to_string(),
            5,
            BudgetTier::Moderate,
            vec!["museums".into()],
            vec!["Couple".into()],
            true,
            true,
            "ctx".into(),
            "Day 1: arrive. Day 2: explore.".into(),
        )
    }

    #[tokio::test]
    async fn test_writes_succeed_without_primary() {
        let dir = TempDir::new().unwrap();
        let storage = json_only(&dir);

        let id = storage.store_itinerary(sample("Oslo")).await;
        assert_eq!(id, 1);

        let recent = storage.get_recent(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].destination, "Oslo");
    }

    #[tokio::test]
    async fn test_clamps_out_of_range_ratings() {
        let dir = TempDir::new().unwrap();
        let storage = json_only(&dir);

        let id = storage.store_itinerary(sample("Oslo")).await;

        // Below range clamps up to 1.
        storage.record_feedback(id, 0, "").await;
        let records = storage.load_all().await.unwrap();
        assert_eq!(records[0].rating, 1);

        // Above range clamps down to 5.
        storage.record_feedback(id, 9, "").await;
        let records = storage.load_all().await.unwrap();
        assert_eq!(records[0].rating, 5);
    }

    #[tokio::test]
    async fn test_feedback_count_tracks_log_length() {
        let dir = TempDir::new().unwrap();
        let storage = json_only(&dir);

        let id = storage.store_itinerary(sample("Oslo")).await;
        assert_eq!(storage.feedback_count(), 0);
        storage.record_feedback(id, 4, "nice").await;
        storage.record_feedback(id, 5, "nicer").await;
        assert_eq!(storage.feedback_count(), 2);
    }

    #[tokio::test]
    async fn test_feedback_for_missing_record_is_silent() {
        let dir = TempDir::new().unwrap();
        let storage = json_only(&dir);

        // No record with this id exists; the call logs and keeps going.
        let count = storage.record_feedback(77, 3, "ghost").await;
        assert_eq!(count, 1);
        assert!(storage.load_all().await.unwrap().is_empty());
    }
}
