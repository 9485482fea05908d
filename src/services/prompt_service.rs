use rand::seq::SliceRandom;

use crate::models::itinerary::BudgetTier;
use crate::models::patterns::TrainingPatterns;

const MAX_SAMPLED_ENHANCEMENTS: usize = 7;
const MAX_RECENT_INSIGHTS: usize = 5;

/// Builds the augmented instruction block appended to the generation prompt.
///
/// Pure apart from the enhancement-phrase sampling: two calls with identical
/// inputs may word the block differently, which is intentional variability
/// in prompt phrasing.
pub fn enhanced_prompt_context(
    patterns: &TrainingPatterns,
    destination: &str,
    trip_days: u32,
    budget: BudgetTier,
    interests: &[String],
) -> String {
    let interests_str = if interests.is_empty() {
        "general sightseeing".to_string()
    } else {
        interests.join(", ")
    };

    let mut parts = vec![
        format!(
            "CRITICAL REQUIREMENT: CREATE A COMPLETE {}-DAY ITINERARY FOR {}",
            trip_days, destination
        ),
        format!("MANDATORY: Generate plans for ALL {} DAYS", trip_days),
        format!("REQUIRED: Day 1 through Day {}", trip_days),
        format!(
            "BUDGET: {} - Adjust ALL recommendations accordingly",
            budget
        ),
        format!("COVER THESE INTERESTS: {}", interests_str),
        "DETAILED REQUIREMENTS for EACH DAY:".to_string(),
        "- Specific venue names, full addresses, contact info".to_string(),
        "- Exact time slots: '9:00 AM - 11:00 AM (2 hours)'".to_string(),
        format!("- Precise costs matching the {} budget", budget),
        "- Detailed transport directions with options".to_string(),
        "- Insider tips and local secrets".to_string(),
        "- Opening hours and booking requirements".to_string(),
        format!("- Restaurant recommendations ({}-appropriate)", budget),
        "- Weather alternatives".to_string(),
        "- Cultural etiquette and useful phrases".to_string(),
    ];

    let insights = &patterns.quality_improvement_insights;
    if !insights.is_empty() {
        parts.push("Learned best practices:".to_string());
        let start = insights.len().saturating_sub(MAX_RECENT_INSIGHTS);
        for insight in &insights[start..] {
            parts.push(format!("  - {}", insight));
        }
    }

    let enhancements = &patterns.learned_prompt_enhancements;
    if !enhancements.is_empty() {
        parts.push("MUST INCLUDE:".to_string());
        let mut rng = rand::thread_rng();
        let count = MAX_SAMPLED_ENHANCEMENTS.min(enhancements.len());
        for phrase in enhancements.choose_multiple(&mut rng, count) {
            parts.push(format!("  - {}", phrase));
        }
    }

    parts.push(format!("STRUCTURE: Day 1 through Day {}", trip_days));
    parts.push("Each day: morning, afternoon, evening plans".to_string());
    parts.push(format!("FINAL: Must include ALL {} days!", trip_days));

    parts.join("\n")
}
