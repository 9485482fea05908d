use log::error;

use crate::models::itinerary::{BudgetTier, ItineraryRecord, NewItinerary};
use crate::models::stats::StatsSnapshot;
use crate::services::prompt_service;
use crate::services::sanitizer::sanitize_comments;
use crate::services::stats_service;
use crate::services::storage::dual::DualStorage;
use crate::services::storage::interface::StorageError;
use crate::services::training_service::{run_training_pass, PatternStore};

const TRAINING_TRIGGER_EVERY: usize = 3;

/// The feedback-driven itinerary system exposed to the HTTP layer:
/// dual-write persistence, aggregate statistics, prompt enhancement and the
/// auto-train bookkeeping. Constructed once at startup and injected into
/// handlers.
pub struct TravelSystem {
    storage: DualStorage,
    patterns: PatternStore,
}

impl TravelSystem {
    pub fn new(storage: DualStorage, patterns: PatternStore) -> Self {
        Self { storage, patterns }
    }

    /// Training pass run once at process startup, before serving requests.
    pub async fn startup_training(&self) {
        if let Err(err) = run_training_pass(&self.storage, &self.patterns).await {
            error!("Startup training pass failed: {}", err);
        }
    }

    /// Persists a generated itinerary through the dual-write path and
    /// returns the assigned id.
    pub async fn store_itinerary(&self, itinerary: NewItinerary) -> i64 {
        self.storage.store_itinerary(itinerary).await
    }

    /// Records a rating and kicks off a training pass after every third
    /// feedback submission. Storage errors are logged, never raised.
    pub async fn record_feedback(&self, itinerary_id: i64, rating: i64, comments: &str) {
        let comments = sanitize_comments(comments);
        let feedback_count = self
            .storage
            .record_feedback(itinerary_id, rating, &comments)
            .await;

        if feedback_count > 0 && feedback_count % TRAINING_TRIGGER_EVERY == 0 {
            if let Err(err) = run_training_pass(&self.storage, &self.patterns).await {
                error!("Auto-training error: {}", err);
            }
        }
    }

    pub async fn get_statistics(&self) -> Result<StatsSnapshot, StorageError> {
        if let Some(snapshot) = self.storage.statistics_from_primary().await {
            return Ok(snapshot);
        }

        let records = self.storage.load_all().await?;
        let patterns = self.patterns.load();
        Ok(stats_service::aggregate(
            &records,
            self.storage.feedback_count(),
            &patterns,
        ))
    }

    pub async fn get_recent_itineraries(
        &self,
        limit: usize,
    ) -> Result<Vec<ItineraryRecord>, StorageError> {
        self.storage.get_recent(limit).await
    }

    /// The augmented instruction block for the next generation call.
    pub fn enhanced_prompt_context(
        &self,
        destination: &str,
        trip_days: u32,
        budget: BudgetTier,
        interests: &[String],
    ) -> String {
        let patterns = self.patterns.load();
        prompt_service::enhanced_prompt_context(&patterns, destination, trip_days, budget, interests)
    }

    pub fn has_primary(&self) -> bool {
        self.storage.has_primary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::json_store::JsonStore;
    use tempfile::TempDir;

    fn system(dir: &TempDir) -> TravelSystem {
        TravelSystem::new(
            DualStorage::new(None, JsonStore::new(dir.path()).unwrap()),
            PatternStore::new(dir.path()).unwrap(),
        )
    }

    fn sample(destination: &str) -> NewItinerary {
        NewItinerary::new(
            destination.to_string(),
            4,
            BudgetTier::Moderate,
            vec!["food".into()],
            vec!["Solo".into()],
            true,
            true,
            "ctx".into(),
            "Day 1: arrive. Day 2: wander. Day 3: museums. Day 4: depart.".into(),
        )
    }

    #[tokio::test]
    async fn test_training_fires_only_on_multiples_of_three() {
        let dir = TempDir::new().unwrap();
        let system = system(&dir);

        let mut ids = Vec::new();
        for city in ["paris", "tokyo", "rome", "oslo", "lima", "cairo"] {
            ids.push(system.store_itinerary(sample(city)).await);
        }

        let expected_iterations = [0, 0, 1, 1, 1, 2];
        for (i, id) in ids.iter().enumerate() {
            system.record_feedback(*id, 5, "").await;
            let stats = system.get_statistics().await.unwrap();
            assert_eq!(
                stats.training_iterations, expected_iterations[i],
                "after feedback #{}",
                i + 1
            );
        }
    }

    #[tokio::test]
    async fn test_statistics_idempotent_without_writes() {
        let dir = TempDir::new().unwrap();
        let system = system(&dir);

        let id = system.store_itinerary(sample("paris")).await;
        system.record_feedback(id, 4, "solid").await;

        let first = system.get_statistics().await.unwrap();
        let second = system.get_statistics().await.unwrap();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_quality_score_set_on_feedback() {
        let dir = TempDir::new().unwrap();
        let system = system(&dir);

        let itinerary = sample("paris");
        let character_count = itinerary.character_count;
        let id = system.store_itinerary(itinerary).await;

        for rating in 1..=5 {
            system.record_feedback(id, rating, "").await;
            let records = system.get_recent_itineraries(1).await.unwrap();
            let expected = crate::models::itinerary::quality_score(rating as u8, character_count);
            assert!(records[0].rated);
            assert_eq!(records[0].quality_score, expected);
        }
    }

    #[tokio::test]
    async fn test_comments_are_sanitized_before_storage() {
        let dir = TempDir::new().unwrap();
        let system = system(&dir);

        let id = system.store_itinerary(sample("paris")).await;
        system.record_feedback(id, 3, "  nice\u{0007} trip  ").await;

        let records = system.get_recent_itineraries(1).await.unwrap();
        assert_eq!(records[0].feedback_comments, "nice trip");
    }
}
