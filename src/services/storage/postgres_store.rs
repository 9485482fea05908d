use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::models::itinerary::{BudgetTier, ItineraryRecord, NewItinerary};
use crate::models::stats::StatsSnapshot;
use crate::services::storage::interface::{RecordStore, StorageError};

/// Relational backend over the externally provisioned schema (`trips`,
/// `itineraries`, `training_data`, `training_cycles`, `system_metrics`).
/// This store only issues parameterized reads and writes against that
/// schema; aggregate maintenance happens in database-side triggers. All ids
/// are BIGINT. One implicit transaction per call.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Snapshot from the trigger-maintained `system_metrics` row plus the
    /// two grouping queries the row does not carry.
    pub async fn statistics(&self) -> Result<StatsSnapshot, StorageError> {
        let metrics = sqlx::query(
            r#"
            SELECT total_trips, total_itineraries, total_ratings,
                   training_cycles_completed, avg_rating, high_quality_samples
            FROM system_metrics
            WHERE id = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let cities = sqlx::query(
            r#"
            SELECT destination, COUNT(*) AS count
            FROM trips
            GROUP BY destination
            ORDER BY count DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let ratings = sqlx::query(
            r#"
            SELECT rating, COUNT(*) AS count
            FROM itineraries
            WHERE rating IS NOT NULL AND rating > 0
            GROUP BY rating
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let word_counts = sqlx::query("SELECT AVG(word_count)::float8 AS avg FROM itineraries")
            .fetch_one(&self.pool)
            .await?;

        let total_itineraries: i64 = metrics.get("total_itineraries");
        let total_ratings: i64 = metrics.get("total_ratings");

        let mut snapshot = StatsSnapshot {
            total_itineraries: total_itineraries as usize,
            total_feedback: total_ratings as usize,
            rated_itineraries: total_ratings as usize,
            average_rating: metrics
                .try_get::<Option<f64>, _>("avg_rating")?
                .unwrap_or(0.0),
            training_iterations: metrics.get::<i32, _>("training_cycles_completed") as u32,
            high_quality_samples: metrics.get::<i64, _>("high_quality_samples") as usize,
            top_cities: cities
                .iter()
                .map(|row| {
                    (
                        row.get::<String, _>("destination"),
                        row.get::<i64, _>("count") as u32,
                    )
                })
                .collect(),
            rating_distribution: Default::default(),
            avg_word_count: word_counts
                .try_get::<Option<f64>, _>("avg")?
                .unwrap_or(0.0),
            total_database_size: total_itineraries as usize,
        };

        for row in &ratings {
            let rating: i32 = row.get("rating");
            let count: i64 = row.get("count");
            snapshot
                .rating_distribution
                .insert(rating as u8, count as u32);
        }

        Ok(snapshot)
    }

    fn row_to_record(row: &PgRow) -> Result<ItineraryRecord, StorageError> {
        let rating = row.try_get::<Option<i32>, _>("rating")?.unwrap_or(0);
        let text: String = row.get("itinerary_text");
        Ok(ItineraryRecord {
            id: row.get("id"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
            destination: row.get("destination"),
            trip_days: row.get::<i32, _>("duration") as u32,
            budget: BudgetTier::parse(&row.get::<String, _>("budget_level")),
            interests: row.get("interests"),
            travel_style: row.get("travel_style"),
            include_food: row.get("include_food"),
            include_transport: row.get("include_transport"),
            // The enhancement context is only kept in the flat-file backup.
            prompt_context: String::new(),
            word_count: row.get::<i32, _>("word_count") as usize,
            character_count: row.get::<i32, _>("character_count") as usize,
            rated: rating > 0,
            rating: rating as u8,
            feedback_comments: row
                .try_get::<Option<String>, _>("feedback_comments")?
                .unwrap_or_default(),
            quality_score: row
                .try_get::<Option<f64>, _>("quality_score")?
                .unwrap_or(0.0),
            used_for_training: row.get("used_for_training"),
            training_iteration: row.get::<i32, _>("training_iteration") as u32,
            itinerary_text: text,
        })
    }
}

const SELECT_JOINED: &str = r#"
    SELECT i.id, i.itinerary_text, i.word_count, i.character_count,
           i.rating, i.feedback_comments, i.quality_score, i.created_at,
           i.used_for_training, i.training_iteration,
           t.destination, t.duration, t.budget_level,
           t.interests, t.travel_style, t.include_food, t.include_transport
    FROM itineraries i
    JOIN trips t ON i.trip_id = t.id
    ORDER BY i.created_at DESC
"#;

impl RecordStore for PostgresStore {
    async fn create_itinerary(
        &self,
        itinerary: NewItinerary,
        _preferred_id: Option<i64>,
    ) -> Result<i64, StorageError> {
        // The primary always assigns its own serial ids.
        let trip_row = sqlx::query(
            r#"
            INSERT INTO trips (destination, interests, duration, budget_level,
                               travel_style, include_food, include_transport)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&itinerary.destination)
        .bind(&itinerary.interests)
        .bind(itinerary.trip_days as i32)
        .bind(itinerary.budget.as_str())
        .bind(&itinerary.travel_style)
        .bind(itinerary.include_food)
        .bind(itinerary.include_transport)
        .fetch_one(&self.pool)
        .await?;
        let trip_id: i64 = trip_row.get("id");

        let itin_row = sqlx::query(
            r#"
            INSERT INTO itineraries (trip_id, itinerary_text, word_count, character_count)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(trip_id)
        .bind(&itinerary.itinerary_text)
        .bind(itinerary.word_count as i32)
        .bind(itinerary.character_count as i32)
        .fetch_one(&self.pool)
        .await?;

        Ok(itin_row.get("id"))
    }

    async fn record_feedback(
        &self,
        itinerary_id: i64,
        rating: u8,
        comments: &str,
    ) -> Result<(), StorageError> {
        // Same scoring as the flat-file path: 16 points per star plus the
        // length bonus capped at 20, rounded to two decimals.
        sqlx::query(
            r#"
            UPDATE itineraries
            SET rating = $1,
                feedback_comments = $2,
                rated_at = NOW(),
                quality_score = ROUND(($1::numeric * 16.0)
                    + LEAST(20.0, character_count / 1000.0), 2)::float8
            WHERE id = $3
            "#,
        )
        .bind(i32::from(rating))
        .bind(comments)
        .bind(itinerary_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ItineraryRecord>, StorageError> {
        let query = format!("{} LIMIT $1", SELECT_JOINED);
        let rows = sqlx::query(&query)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn load_all(&self) -> Result<Vec<ItineraryRecord>, StorageError> {
        let rows = sqlx::query(SELECT_JOINED).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn mark_trained(&self, ids: &[i64], iteration: u32) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            UPDATE itineraries
            SET used_for_training = TRUE,
                training_iteration = $1
            WHERE id = ANY($2) AND used_for_training = FALSE
            "#,
        )
        .bind(iteration as i32)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
