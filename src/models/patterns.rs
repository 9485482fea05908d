use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::itinerary::BudgetTier;

pub const MAX_INSIGHTS: usize = 15;
pub const MAX_BEST_PROMPTS: usize = 10;

/// Compact summary of a 5-star itinerary kept for prompt construction.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BestPromptSummary {
    pub destination: String,
    pub days: u32,
    pub budget: BudgetTier,
    pub rating: u8,
    pub word_count: usize,
}

/// The single mutable pattern document driving prompt enhancement.
///
/// Owned and mutated only by the auto-trainer; everything else reads it.
/// `total_training_samples` is overwritten with the size of the current
/// high-quality subset on every pass, not accumulated.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TrainingPatterns {
    pub last_update: DateTime<Utc>,
    pub training_iterations: u32,
    pub total_training_samples: usize,
    #[serde(default)]
    pub high_rated_cities: BTreeMap<String, u32>,
    #[serde(default)]
    pub quality_improvement_insights: Vec<String>,
    #[serde(default)]
    pub best_performing_prompts: Vec<BestPromptSummary>,
    #[serde(default = "default_enhancements")]
    pub learned_prompt_enhancements: Vec<String>,
}

impl TrainingPatterns {
    /// The fixed seed document written on first use.
    pub fn seed() -> Self {
        Self {
            last_update: Utc::now(),
            training_iterations: 0,
            total_training_samples: 0,
            high_rated_cities: BTreeMap::new(),
            quality_improvement_insights: Vec::new(),
            best_performing_prompts: Vec::new(),
            learned_prompt_enhancements: default_enhancements(),
        }
    }
}

impl Default for TrainingPatterns {
    fn default() -> Self {
        Self::seed()
    }
}

/// Enhancement phrases used verbatim in prompts.
pub fn default_enhancements() -> Vec<String> {
    [
        "Include specific venue names with full addresses and contact details",
        "Add exact time allocations for each activity with start and end times",
        "Provide precise cost estimates in local currency",
        "Include detailed transport directions with multiple options",
        "Add insider tips and local secrets from experienced travelers",
        "Mention opening hours, booking requirements, and best visiting times",
        "Suggest specific restaurants with price ranges and signature dishes",
        "Provide alternative indoor/outdoor options for weather flexibility",
        "Include cultural etiquette tips and useful local phrases",
        "Add photo opportunities and best viewpoints at each location",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Candidate insight sentences; one is picked at random per training pass.
pub const INSIGHT_CATALOG: [&str; 12] = [
    "Itineraries with exact time slots receive higher ratings",
    "Including restaurant details improves satisfaction",
    "Weather alternatives increase user satisfaction",
    "Transport cost breakdowns are highly valued",
    "Opening hours mentioned upfront reduce friction",
    "Grouping nearby attractions saves time",
    "Cultural tips enhance travel experience",
    "Budget breakdowns help planning",
    "Insider tips boost ratings significantly",
    "Day-by-day structure is preferred format",
    "Photo spots increase engagement",
    "Multi-option transport suggestions are valued",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_document_shape() {
        let seed = TrainingPatterns::seed();
        assert_eq!(seed.training_iterations, 0);
        assert_eq!(seed.total_training_samples, 0);
        assert!(seed.high_rated_cities.is_empty());
        assert!(seed.quality_improvement_insights.is_empty());
        assert!(seed.best_performing_prompts.is_empty());
        assert_eq!(seed.learned_prompt_enhancements.len(), 10);
    }

    #[test]
    fn test_best_prompt_structural_equality() {
        let a = BestPromptSummary {
            destination: "Tokyo".into(),
            days: 5,
            budget: BudgetTier::Luxury,
            rating: 5,
            word_count: 1200,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
