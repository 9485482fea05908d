use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::itinerary::{
    quality_score, BudgetTier, FeedbackEntry, ItineraryRecord, NewItinerary,
};
use crate::services::storage::interface::{RecordStore, StorageError};

const ITINERARIES_FILE: &str = "complete_itineraries.json";
const FEEDBACK_FILE: &str = "feedback.json";
const CACHE_TTL: Duration = Duration::from_secs(60);

/// Flat-file backend: each collection is one JSON array document, loaded
/// whole, mutated in memory and written back whole. Single active writer
/// assumed; a mutex serializes the actix workers within this process.
pub struct JsonStore {
    itineraries_file: PathBuf,
    feedback_file: PathBuf,
    cache: Mutex<Option<(Instant, Vec<ItineraryRecord>)>>,
    cache_ttl: Duration,
}

impl JsonStore {
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir)?;

        let store = Self {
            itineraries_file: data_dir.join(ITINERARIES_FILE),
            feedback_file: data_dir.join(FEEDBACK_FILE),
            cache: Mutex::new(None),
            cache_ttl: CACHE_TTL,
        };

        for file in [&store.itineraries_file, &store.feedback_file] {
            if !file.exists() {
                fs::write(file, "[]")?;
            }
        }

        Ok(store)
    }

    #[cfg(test)]
    pub fn with_cache_ttl(data_dir: &Path, ttl: Duration) -> Result<Self, StorageError> {
        let mut store = Self::new(data_dir)?;
        store.cache_ttl = ttl;
        Ok(store)
    }

    /// Reads the itinerary collection from disk, bypassing the cache.
    /// Mutations always start from this authoritative copy.
    fn read_itineraries(&self) -> Result<Vec<ItineraryRecord>, StorageError> {
        if !self.itineraries_file.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.itineraries_file)?;
        let legacy: Vec<LegacyItinerary> = serde_json::from_str(&raw)?;
        Ok(legacy.into_iter().map(LegacyItinerary::into_record).collect())
    }

    /// Read-through cached load used by the non-mutating operations.
    fn load_cached(&self) -> Result<Vec<ItineraryRecord>, StorageError> {
        let mut cache = self.cache.lock().expect("itinerary cache poisoned");
        if let Some((loaded_at, records)) = cache.as_ref() {
            if loaded_at.elapsed() < self.cache_ttl {
                return Ok(records.clone());
            }
        }
        let records = self.read_itineraries()?;
        *cache = Some((Instant::now(), records.clone()));
        Ok(records)
    }

    fn save_itineraries(&self, records: &[ItineraryRecord]) -> Result<(), StorageError> {
        let legacy: Vec<LegacyItinerary> =
            records.iter().map(LegacyItinerary::from_record).collect();
        let raw = serde_json::to_string_pretty(&legacy)?;
        fs::write(&self.itineraries_file, raw)?;

        // Any mutation invalidates the read cache immediately.
        *self.cache.lock().expect("itinerary cache poisoned") = None;
        Ok(())
    }

    pub fn load_feedback(&self) -> Result<Vec<FeedbackEntry>, StorageError> {
        if !self.feedback_file.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.feedback_file)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Appends one entry to the append-only feedback log and returns the new
    /// total, which drives the auto-train trigger.
    pub fn append_feedback(&self, entry: FeedbackEntry) -> Result<usize, StorageError> {
        let mut entries = self.load_feedback()?;
        entries.push(entry);
        let raw = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.feedback_file, raw)?;
        Ok(entries.len())
    }

    pub fn feedback_count(&self) -> Result<usize, StorageError> {
        Ok(self.load_feedback()?.len())
    }
}

impl RecordStore for JsonStore {
    async fn create_itinerary(
        &self,
        itinerary: NewItinerary,
        preferred_id: Option<i64>,
    ) -> Result<i64, StorageError> {
        let mut records = self.read_itineraries()?;
        let id = preferred_id.unwrap_or(records.len() as i64 + 1);
        records.push(itinerary.into_record(id));
        self.save_itineraries(&records)?;
        Ok(id)
    }

    async fn record_feedback(
        &self,
        itinerary_id: i64,
        rating: u8,
        comments: &str,
    ) -> Result<(), StorageError> {
        let mut records = self.read_itineraries()?;
        if let Some(record) = records.iter_mut().find(|r| r.id == itinerary_id) {
            record.rated = true;
            record.rating = rating;
            record.feedback_comments = comments.to_string();
            record.quality_score = quality_score(rating, record.character_count);
        }
        // Unknown id: nothing matched, nothing to write back, not an error.
        self.save_itineraries(&records)
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ItineraryRecord>, StorageError> {
        let records = self.load_cached()?;
        Ok(records.into_iter().rev().take(limit).collect())
    }

    async fn load_all(&self) -> Result<Vec<ItineraryRecord>, StorageError> {
        self.load_cached()
    }

    async fn mark_trained(&self, ids: &[i64], iteration: u32) -> Result<(), StorageError> {
        let mut records = self.read_itineraries()?;
        for record in records.iter_mut() {
            if ids.contains(&record.id) && !record.used_for_training {
                record.used_for_training = true;
                record.training_iteration = iteration;
            }
        }
        self.save_itineraries(&records)
    }
}

/// On-disk shape of one itinerary, carrying the legacy compatibility aliases
/// (`city`/`destination`, `trip_days`/`duration`, `budget`/`budget_level`,
/// `full_itinerary`/`itinerary_text`). The aliases exist only here; the rest
/// of the crate sees canonical `ItineraryRecord` fields.
#[derive(Debug, Serialize, Deserialize)]
struct LegacyItinerary {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    trip_days: Option<u32>,
    #[serde(default)]
    duration: Option<u32>,
    #[serde(default)]
    budget: Option<String>,
    #[serde(default)]
    budget_level: Option<String>,
    #[serde(default)]
    interests: Vec<String>,
    #[serde(default)]
    travel_style: Vec<String>,
    #[serde(default = "default_true")]
    include_food: bool,
    #[serde(default = "default_true")]
    include_transport: bool,
    #[serde(default)]
    full_prompt_context: String,
    #[serde(default)]
    full_itinerary: Option<String>,
    #[serde(default)]
    itinerary_text: Option<String>,
    #[serde(default)]
    itinerary_length: Option<usize>,
    #[serde(default)]
    word_count: Option<usize>,
    #[serde(default)]
    rated: bool,
    #[serde(default)]
    rating: Option<u8>,
    #[serde(default)]
    feedback_comments: Option<String>,
    #[serde(default)]
    quality_score: Option<f64>,
    #[serde(default)]
    used_for_training: bool,
    #[serde(default)]
    training_iteration: u32,
}

fn default_true() -> bool {
    true
}

impl LegacyItinerary {
    fn from_record(record: &ItineraryRecord) -> Self {
        Self {
            id: record.id,
            timestamp: Some(record.created_at),
            city: Some(record.destination.clone()),
            destination: Some(record.destination.clone()),
            trip_days: Some(record.trip_days),
            duration: Some(record.trip_days),
            budget: Some(record.budget.to_string()),
            budget_level: Some(record.budget.to_string()),
            interests: record.interests.clone(),
            travel_style: record.travel_style.clone(),
            include_food: record.include_food,
            include_transport: record.include_transport,
            full_prompt_context: record.prompt_context.clone(),
            full_itinerary: Some(record.itinerary_text.clone()),
            itinerary_text: Some(record.itinerary_text.clone()),
            itinerary_length: Some(record.character_count),
            word_count: Some(record.word_count),
            rated: record.rated,
            rating: Some(record.rating),
            feedback_comments: Some(record.feedback_comments.clone()),
            quality_score: Some(record.quality_score),
            used_for_training: record.used_for_training,
            training_iteration: record.training_iteration,
        }
    }

    /// Resolves the alias pairs and repairs null feedback fields to their
    /// unrated defaults instead of failing the load.
    fn into_record(self) -> ItineraryRecord {
        let destination = self
            .city
            .or(self.destination)
            .unwrap_or_else(|| "Unknown".to_string());
        let trip_days = self.trip_days.or(self.duration).unwrap_or(1);
        let budget = self
            .budget
            .or(self.budget_level)
            .map(|s| BudgetTier::parse(&s))
            .unwrap_or_default();
        let itinerary_text = self
            .full_itinerary
            .or(self.itinerary_text)
            .unwrap_or_default();
        let word_count = self
            .word_count
            .unwrap_or_else(|| itinerary_text.split_whitespace().count());
        let character_count = self
            .itinerary_length
            .unwrap_or_else(|| itinerary_text.chars().count());
        let rating = self.rating.unwrap_or(0);

        ItineraryRecord {
            id: self.id,
            created_at: self.timestamp.unwrap_or_else(Utc::now),
            destination,
            trip_days,
            budget,
            interests: self.interests,
            travel_style: self.travel_style,
            include_food: self.include_food,
            include_transport: self.include_transport,
            prompt_context: self.full_prompt_context,
            itinerary_text,
            word_count,
            character_count,
            rated: self.rated || rating > 0,
            rating,
            feedback_comments: self.feedback_comments.unwrap_or_default(),
            quality_score: self.quality_score.unwrap_or(0.0),
            used_for_training: self.used_for_training,
            training_iteration: self.training_iteration,
        }
    }
}
