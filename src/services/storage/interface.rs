use crate::models::itinerary::{ItineraryRecord, NewItinerary};

/// Failures a storage backend can report. The dual-write coordinator is the
/// one place that decides which of these are absorbed and which propagate.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Serialization(serde_json::Error),
    Database(sqlx::Error),
    Unavailable(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "I/O error: {}", err),
            StorageError::Serialization(err) => write!(f, "Serialization error: {}", err),
            StorageError::Database(err) => write!(f, "Database error: {}", err),
            StorageError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err)
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Database(err)
    }
}

/// Backend-agnostic record store contract. Every mutating call persists
/// immediately; there is no batching.
pub trait RecordStore {
    /// Stores a new itinerary and returns the backend-assigned id. When
    /// `preferred_id` is set (an id already assigned by another backend),
    /// the record is stored under that id instead.
    async fn create_itinerary(
        &self,
        itinerary: NewItinerary,
        preferred_id: Option<i64>,
    ) -> Result<i64, StorageError>;

    /// Updates the matching record in place. The rating arrives already
    /// clamped into 1..=5 and the comments sanitized. A missing id is a
    /// no-op, not an error.
    async fn record_feedback(
        &self,
        itinerary_id: i64,
        rating: u8,
        comments: &str,
    ) -> Result<(), StorageError>;

    /// Newest-first, bounded to `limit`.
    async fn list_recent(&self, limit: usize) -> Result<Vec<ItineraryRecord>, StorageError>;

    /// Full scan, used by the aggregator and the auto-trainer.
    async fn load_all(&self) -> Result<Vec<ItineraryRecord>, StorageError>;

    /// Flags the given records as consumed by a training pass and stamps the
    /// iteration number. Already-marked records are left untouched.
    async fn mark_trained(&self, ids: &[i64], iteration: u32) -> Result<(), StorageError>;
}
