use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};
use rand::seq::SliceRandom;

use crate::models::itinerary::{title_case, ItineraryRecord};
use crate::models::patterns::{
    BestPromptSummary, TrainingPatterns, INSIGHT_CATALOG, MAX_BEST_PROMPTS, MAX_INSIGHTS,
};
use crate::services::storage::dual::DualStorage;
use crate::services::storage::interface::StorageError;

const PATTERNS_FILE: &str = "training_patterns.json";

/// File-backed handle to the singleton pattern document. Only the
/// auto-trainer mutates it; everything else reads.
pub struct PatternStore {
    file: PathBuf,
}

impl PatternStore {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir)?;
        let store = Self {
            file: data_dir.join(PATTERNS_FILE),
        };
        if !store.file.exists() {
            store.save(&TrainingPatterns::seed())?;
        }
        Ok(store)
    }

    /// An unreadable or corrupt document degrades to the seed rather than
    /// failing the caller.
    pub fn load(&self) -> TrainingPatterns {
        match fs::read_to_string(&self.file) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("Pattern document unreadable, reseeding: {}", err);
                TrainingPatterns::seed()
            }),
            Err(_) => TrainingPatterns::seed(),
        }
    }

    pub fn save(&self, patterns: &TrainingPatterns) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(patterns)?;
        fs::write(&self.file, raw)?;
        Ok(())
    }
}

/// One auto-train pass: bookkeeping over the current record set, not a
/// statistical model. Runs after every third feedback submission and once at
/// startup. Returns whether the pass actually fired.
pub async fn run_training_pass(
    storage: &DualStorage,
    pattern_store: &PatternStore,
) -> Result<bool, StorageError> {
    let records = storage.load_all().await?;
    if records.len() < 3 {
        return Ok(false);
    }

    let high_quality: Vec<&ItineraryRecord> =
        records.iter().filter(|r| r.is_high_quality()).collect();
    if high_quality.is_empty() {
        return Ok(false);
    }

    info!(
        "Auto-training from {} high-quality itineraries",
        high_quality.len()
    );

    let mut patterns = pattern_store.load();

    for record in &high_quality {
        *patterns
            .high_rated_cities
            .entry(title_case(&record.destination))
            .or_insert(0) += 1;
    }

    let insight = {
        let mut rng = rand::thread_rng();
        INSIGHT_CATALOG.choose(&mut rng).map(|s| s.to_string())
    };
    if let Some(insight) = insight {
        if !patterns.quality_improvement_insights.contains(&insight) {
            patterns.quality_improvement_insights.push(insight);
            let len = patterns.quality_improvement_insights.len();
            if len > MAX_INSIGHTS {
                patterns
                    .quality_improvement_insights
                    .drain(..len - MAX_INSIGHTS);
            }
        }
    }

    for record in &high_quality {
        if record.rating == 5 {
            let summary = BestPromptSummary {
                destination: record.destination.clone(),
                days: record.trip_days,
                budget: record.budget,
                rating: record.rating,
                word_count: record.word_count,
            };
            if !patterns.best_performing_prompts.contains(&summary) {
                patterns.best_performing_prompts.push(summary);
                let len = patterns.best_performing_prompts.len();
                if len > MAX_BEST_PROMPTS {
                    patterns.best_performing_prompts.drain(..len - MAX_BEST_PROMPTS);
                }
            }
        }
    }

    patterns.training_iterations += 1;
    // Overwritten with the size of the current subset on every pass; the
    // counter is a snapshot, not a running total.
    patterns.total_training_samples = high_quality.len();
    patterns.last_update = Utc::now();

    let fresh_ids: Vec<i64> = high_quality
        .iter()
        .filter(|r| !r.used_for_training)
        .map(|r| r.id)
        .collect();
    let iteration = patterns.training_iterations;

    pattern_store.save(&patterns)?;
    if !fresh_ids.is_empty() {
        storage.mark_trained(&fresh_ids, iteration).await;
    }

    info!("Auto-training completed, iteration #{}", iteration);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::itinerary::{BudgetTier, NewItinerary};
    use crate::services::storage::json_store::JsonStore;
    use tempfile::TempDir;

    fn json_only(dir: &TempDir) -> DualStorage {
        DualStorage::new(None, JsonStore::new(dir.path()).unwrap())
    }

    fn sample(destination: &str) -> NewItinerary {
        NewItinerary::new(
            destination.to_string(),
            5,
            BudgetTier::Moderate,
            vec!["food".into()],
            vec!["Solo".into()],
            true,
            true,
            "ctx".into(),
            "Day 1: arrive and settle in. Day 2: old town.".into(),
        )
    }

    async fn seeded_system(
        dir: &TempDir,
        cities: &[&str],
        ratings: &[i64],
    ) -> (DualStorage, PatternStore) {
        let storage = json_only(dir);
        let patterns = PatternStore::new(dir.path()).unwrap();
        for (i, (city, rating)) in cities.iter().zip(ratings).enumerate() {
            // Vary the text length so summaries stay structurally distinct.
            let mut itinerary = sample(city);
            itinerary.itinerary_text = format!("Day 1: arrive. {}", "Stop. ".repeat(i + 1));
            itinerary.word_count = itinerary.itinerary_text.split_whitespace().count();
            itinerary.character_count = itinerary.itinerary_text.chars().count();
            let id = storage.store_itinerary(itinerary).await;
            if *rating > 0 {
                storage.record_feedback(id, *rating, "").await;
            }
        }
        (storage, patterns)
    }

    #[tokio::test]
    async fn test_skips_with_fewer_than_three_records() {
        let dir = TempDir::new().unwrap();
        let (storage, patterns) = seeded_system(&dir, &["paris", "rome"], &[5, 5]).await;
        assert!(!run_training_pass(&storage, &patterns).await.unwrap());
        assert_eq!(patterns.load().training_iterations, 0);
    }

    #[tokio::test]
    async fn test_skips_without_high_quality_records() {
        let dir = TempDir::new().unwrap();
        let (storage, patterns) =
            seeded_system(&dir, &["paris", "rome", "oslo"], &[3, 2, 0]).await;
        assert!(!run_training_pass(&storage, &patterns).await.unwrap());
        assert_eq!(patterns.load().training_iterations, 0);
    }

    #[tokio::test]
    async fn test_counts_high_rated_cities_and_best_prompts() {
        let dir = TempDir::new().unwrap();
        let (storage, patterns) =
            seeded_system(&dir, &["paris", "tokyo", "tokyo"], &[5, 5, 5]).await;

        assert!(run_training_pass(&storage, &patterns).await.unwrap());

        let doc = patterns.load();
        assert_eq!(doc.high_rated_cities.get("Tokyo"), Some(&2));
        assert_eq!(doc.high_rated_cities.get("Paris"), Some(&1));
        assert_eq!(doc.best_performing_prompts.len(), 3);
        assert_eq!(doc.training_iterations, 1);
        assert_eq!(doc.total_training_samples, 3);
    }

    #[tokio::test]
    async fn test_marks_records_used_for_training() {
        let dir = TempDir::new().unwrap();
        let (storage, patterns) =
            seeded_system(&dir, &["paris", "tokyo", "rome"], &[5, 4, 2]).await;

        run_training_pass(&storage, &patterns).await.unwrap();

        let records = storage.load_all().await.unwrap();
        let trained: Vec<_> = records.iter().filter(|r| r.used_for_training).collect();
        assert_eq!(trained.len(), 2);
        assert!(trained.iter().all(|r| r.training_iteration == 1));
        // The 2-star record is untouched.
        assert!(records.iter().any(|r| !r.used_for_training));
    }

    #[tokio::test]
    async fn test_sample_counter_is_not_cumulative() {
        let dir = TempDir::new().unwrap();
        let (storage, patterns) =
            seeded_system(&dir, &["paris", "tokyo", "rome"], &[5, 5, 0]).await;

        run_training_pass(&storage, &patterns).await.unwrap();
        assert_eq!(patterns.load().total_training_samples, 2);

        // A third high-quality record: the counter snaps to the new subset
        // size instead of accumulating.
        let id = storage.store_itinerary(sample("lima")).await;
        storage.record_feedback(id, 4, "").await;
        run_training_pass(&storage, &patterns).await.unwrap();
        assert_eq!(patterns.load().total_training_samples, 3);
        assert_eq!(patterns.load().training_iterations, 2);
    }

    #[tokio::test]
    async fn test_insight_list_stays_bounded() {
        let dir = TempDir::new().unwrap();
        let (storage, patterns) =
            seeded_system(&dir, &["paris", "tokyo", "rome"], &[5, 5, 4]).await;

        for _ in 0..20 {
            run_training_pass(&storage, &patterns).await.unwrap();
        }

        let doc = patterns.load();
        assert!(doc.quality_improvement_insights.len() <= MAX_INSIGHTS);
        assert_eq!(doc.training_iterations, 20);
        // Dedup by exact match: no sentence appears twice.
        let mut unique = doc.quality_improvement_insights.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), doc.quality_improvement_insights.len());
    }
}
