use crate::models::itinerary::{title_case, ItineraryRecord};
use crate::models::patterns::TrainingPatterns;
use crate::models::stats::StatsSnapshot;

/// Builds the aggregate snapshot from a full record scan. Records with a
/// missing rating count as unrated: excluded from the average and the
/// histogram, never an error.
pub fn aggregate(
    records: &[ItineraryRecord],
    feedback_count: usize,
    patterns: &TrainingPatterns,
) -> StatsSnapshot {
    if records.is_empty() {
        return StatsSnapshot {
            total_feedback: feedback_count,
            training_iterations: patterns.training_iterations,
            high_quality_samples: patterns.total_training_samples,
            ..Default::default()
        };
    }

    let rated: Vec<&ItineraryRecord> = records.iter().filter(|r| r.is_rated()).collect();
    let rating_sum: u32 = rated.iter().map(|r| u32::from(r.rating)).sum();
    let average_rating = if rated.is_empty() {
        0.0
    } else {
        f64::from(rating_sum) / rated.len() as f64
    };

    // Counting pass keyed on title-cased names; ties in the top-5 keep the
    // order in which a destination was first encountered.
    let mut city_counts: Vec<(String, u32)> = Vec::new();
    for record in records {
        let city = title_case(&record.destination);
        match city_counts.iter_mut().find(|(name, _)| *name == city) {
            Some((_, count)) => *count += 1,
            None => city_counts.push((city, 1)),
        }
    }
    city_counts.sort_by(|a, b| b.1.cmp(&a.1));
    city_counts.truncate(5);

    let mut rating_distribution = std::collections::BTreeMap::new();
    for record in &rated {
        *rating_distribution.entry(record.rating).or_insert(0) += 1;
    }

    let total_words: usize = records.iter().map(|r| r.word_count).sum();

    StatsSnapshot {
        total_itineraries: records.len(),
        total_feedback: feedback_count,
        rated_itineraries: rated.len(),
        average_rating,
        training_iterations: patterns.training_iterations,
        high_quality_samples: patterns.total_training_samples,
        top_cities: city_counts,
        rating_distribution,
        avg_word_count: total_words as f64 / records.len() as f64,
        total_database_size: records.len(),
    }
}
