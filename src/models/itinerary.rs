use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_TRIP_DAYS: u32 = 1;
pub const MAX_TRIP_DAYS: u32 = 30;

/// Fixed budget tiers understood by the planner and the cost estimator.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum BudgetTier {
    Budget,
    Moderate,
    Luxury,
}

impl BudgetTier {
    /// Lenient parse for values coming from legacy JSON or free-form input.
    /// Unknown strings fall back to Moderate.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "budget" => BudgetTier::Budget,
            "luxury" => BudgetTier::Luxury,
            _ => BudgetTier::Moderate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetTier::Budget => "Budget",
            BudgetTier::Moderate => "Moderate",
            BudgetTier::Luxury => "Luxury",
        }
    }
}

impl Default for BudgetTier {
    fn default() -> Self {
        BudgetTier::Moderate
    }
}

impl std::fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One stored generated travel plan plus its feedback state.
///
/// Canonical field names only; the flat-file backend translates to and from
/// the legacy dual-key JSON shape at its own boundary.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryRecord {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub destination: String,
    pub trip_days: u32,
    pub budget: BudgetTier,
    pub interests: Vec<String>,
    pub travel_style: Vec<String>,
    pub include_food: bool,
    pub include_transport: bool,
    pub prompt_context: String,
    pub itinerary_text: String,
    pub word_count: usize,
    pub character_count: usize,
    pub rated: bool,
    /// 0 = unrated sentinel, otherwise 1..=5.
    pub rating: u8,
    pub feedback_comments: String,
    pub quality_score: f64,
    pub used_for_training: bool,
    pub training_iteration: u32,
}

impl ItineraryRecord {
    pub fn is_rated(&self) -> bool {
        self.rated && self.rating > 0
    }

    pub fn is_high_quality(&self) -> bool {
        self.rating >= 4
    }
}

/// Fields supplied at creation time; the backend assigns the id.
#[derive(Debug, Clone)]
pub struct NewItinerary {
    pub destination: String,
    pub trip_days: u32,
    pub budget: BudgetTier,
    pub interests: Vec<String>,
    pub travel_style: Vec<String>,
    pub include_food: bool,
    pub include_transport: bool,
    pub prompt_context: String,
    pub itinerary_text: String,
    pub word_count: usize,
    pub character_count: usize,
    pub created_at: DateTime<Utc>,
}

impl NewItinerary {
    /// Derives word and character counts from the generated text and clamps
    /// the day count into the supported range.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        destination: String,
        trip_days: u32,
        budget: BudgetTier,
        interests: Vec<String>,
        travel_style: Vec<String>,
        include_food: bool,
        include_transport: bool,
        prompt_context: String,
        itinerary_text: String,
    ) -> Self {
        let word_count = itinerary_text.split_whitespace().count();
        let character_count = itinerary_text.chars().count();
        let interests = if interests.is_empty() {
            vec!["Everything".to_string()]
        } else {
            interests
        };

        Self {
            destination,
            trip_days: trip_days.clamp(MIN_TRIP_DAYS, MAX_TRIP_DAYS),
            budget,
            interests,
            travel_style,
            include_food,
            include_transport,
            prompt_context,
            itinerary_text,
            word_count,
            character_count,
            created_at: Utc::now(),
        }
    }

    /// Materializes the record a backend stores, with feedback fields at
    /// their unrated defaults.
    pub fn into_record(self, id: i64) -> ItineraryRecord {
        ItineraryRecord {
            id,
            created_at: self.created_at,
            destination: self.destination,
            trip_days: self.trip_days,
            budget: self.budget,
            interests: self.interests,
            travel_style: self.travel_style,
            include_food: self.include_food,
            include_transport: self.include_transport,
            prompt_context: self.prompt_context,
            itinerary_text: self.itinerary_text,
            word_count: self.word_count,
            character_count: self.character_count,
            rated: false,
            rating: 0,
            feedback_comments: String::new(),
            quality_score: 0.0,
            used_for_training: false,
            training_iteration: 0,
        }
    }
}

/// Append-only feedback log entry, one per rating submission.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedbackEntry {
    pub timestamp: DateTime<Utc>,
    pub itinerary_id: i64,
    pub rating: u8,
    pub comments: String,
}

/// Incoming trip request from the UI layer.
#[derive(Debug, Deserialize, Clone)]
pub struct TripRequest {
    pub destination: String,
    #[serde(default = "default_trip_days")]
    pub trip_days: u32,
    #[serde(default)]
    pub budget: BudgetTier,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub travel_style: Vec<String>,
    #[serde(default = "default_true")]
    pub include_food: bool,
    #[serde(default = "default_true")]
    pub include_transport: bool,
}

fn default_trip_days() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// Quality score: 16 points per star plus a length bonus capped at 20,
/// rounded to two decimals.
pub fn quality_score(rating: u8, character_count: usize) -> f64 {
    let length_bonus = (character_count as f64 / 1000.0).min(20.0);
    let score = f64::from(rating) * 16.0 + length_bonus;
    (score * 100.0).round() / 100.0
}

/// Title-cases a destination name for display and aggregation keys.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_score_formula() {
        // 5 stars, 3000 chars: 80 + 3.0
        assert_eq!(quality_score(5, 3000), 83.0);
        // length bonus caps at 20
        assert_eq!(quality_score(4, 50_000), 84.0);
        // rounds to two decimals
        assert_eq!(quality_score(1, 1234), 17.23);
    }

    #[test]
    fn test_trip_days_clamped() {
        let itin = NewItinerary::new(
            "Paris".into(),
            90,
            BudgetTier::Moderate,
            vec![],
            vec![],
            true,
            true,
            String::new(),
            "Day 1: walk".into(),
        );
        assert_eq!(itin.trip_days, 30);

        let itin = NewItinerary::new(
            "Paris".into(),
            0,
            BudgetTier::Moderate,
            vec![],
            vec![],
            true,
            true,
            String::new(),
            "Day 1: walk".into(),
        );
        assert_eq!(itin.trip_days, 1);
    }

    #[test]
    fn test_empty_interests_get_sentinel() {
        let itin = NewItinerary::new(
            "Rome".into(),
            3,
            BudgetTier::Budget,
            vec![],
            vec!["Solo".into()],
            true,
            false,
            String::new(),
            "Day 1".into(),
        );
        assert_eq!(itin.interests, vec!["Everything".to_string()]);
    }

    #[test]
    fn test_budget_tier_parse() {
        assert_eq!(BudgetTier::parse("budget"), BudgetTier::Budget);
        assert_eq!(BudgetTier::parse("LUXURY"), BudgetTier::Luxury);
        assert_eq!(BudgetTier::parse("whatever"), BudgetTier::Moderate);
        assert_eq!(BudgetTier::parse(""), BudgetTier::Moderate);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("tokyo"), "Tokyo");
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("PARIS"), "Paris");
    }
}
