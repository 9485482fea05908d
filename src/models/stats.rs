use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregate snapshot served by the stats endpoint.
///
/// `top_cities` is bounded to five entries; ties keep the order in which the
/// destination was first encountered during the counting pass.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StatsSnapshot {
    pub total_itineraries: usize,
    pub total_feedback: usize,
    pub rated_itineraries: usize,
    pub average_rating: f64,
    pub training_iterations: u32,
    pub high_quality_samples: usize,
    pub top_cities: Vec<(String, u32)>,
    pub rating_distribution: BTreeMap<u8, u32>,
    pub avg_word_count: f64,
    pub total_database_size: usize,
}
