use log::{info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;

use crate::models::itinerary::BudgetTier;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "llama-3.3-70b-versatile";
const MAX_TOKENS: u32 = 8000;
const MIN_ITINERARY_CHARS: usize = 100;

#[derive(Debug)]
pub enum PlannerError {
    MissingCredentials(String),
    Network(String),
    ApiError { status: u16, message: String },
    TruncatedResponse(usize),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerError::MissingCredentials(var) => {
                write!(f, "Missing credentials: {} not set", var)
            }
            PlannerError::Network(msg) => write!(f, "Network error: {}", msg),
            PlannerError::ApiError { status, message } => {
                write!(f, "Groq API error ({}): {}", status, message)
            }
            PlannerError::TruncatedResponse(len) => {
                write!(f, "Generated itinerary is too short or empty (length: {})", len)
            }
        }
    }
}

impl std::error::Error for PlannerError {}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// The upstream text-generation call, treated as opaque: one request, no
/// retries. Failures surface to the caller as generation errors.
pub struct PlannerService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl PlannerService {
    /// GROQ keys are `gsk_`-prefixed and comfortably longer than 30 chars.
    pub fn valid_key_format(key: &str) -> bool {
        key.starts_with("gsk_") && key.len() > 30
    }

    pub fn from_env() -> Result<Self, PlannerError> {
        let api_key = env::var("GROQ_API_KEY")
            .map_err(|_| PlannerError::MissingCredentials("GROQ_API_KEY".into()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: env::var("GROQ_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
            model: env::var("GROQ_MODEL_OVERRIDE").unwrap_or_else(|_| GROQ_MODEL.into()),
        })
    }

    /// Generates the full day-by-day itinerary text. `prompt_context` is the
    /// enhancement block produced from the pattern document.
    pub async fn create_itinerary(
        &self,
        destination: &str,
        trip_days: u32,
        budget: BudgetTier,
        interests: &[String],
        prompt_context: &str,
    ) -> Result<String, PlannerError> {
        let prompt = build_prompt(destination, trip_days, budget, interests, prompt_context);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: prompt,
            }],
            temperature: 0.7,
            max_tokens: MAX_TOKENS,
            top_p: 0.9,
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PlannerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PlannerError::ApiError { status, message });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::Network(e.to_string()))?;

        let itinerary = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if itinerary.len() < MIN_ITINERARY_CHARS {
            return Err(PlannerError::TruncatedResponse(itinerary.len()));
        }

        let days_found = count_days_covered(&itinerary, trip_days);
        if days_found < trip_days {
            warn!(
                "Only {}/{} days found in itinerary for {}, output may be truncated",
                days_found, trip_days, destination
            );
        } else {
            info!(
                "Itinerary generated for {}: {} chars, all {} days covered",
                destination,
                itinerary.len(),
                trip_days
            );
        }

        Ok(itinerary)
    }
}

fn build_prompt(
    destination: &str,
    trip_days: u32,
    budget: BudgetTier,
    interests: &[String],
    prompt_context: &str,
) -> String {
    let interests_str = interests.join(", ");
    format!(
        "You are an expert travel planner. Create a COMPLETE {days}-day itinerary for {destination}.\n\
         \n\
         CRITICAL REQUIREMENTS:\n\
         1. YOU MUST CREATE PLANS FOR ALL {days} DAYS - DO NOT STOP EARLY!\n\
         2. Budget Level: {budget} - Adjust ALL recommendations accordingly\n\
         3. Cover: {interests}\n\
         \n\
         For EACH of the {days} days, include morning (9 AM - 12 PM), afternoon\n\
         (12 PM - 5 PM) and evening (5 PM - 10 PM) activities with exact timing,\n\
         venue names and addresses, costs matching the {budget} budget, transport\n\
         directions, and insider tips.\n\
         {context}\n\
         \n\
         Start with Day 1 and continue through Day {days}.\n\
         Generate the complete {days}-day itinerary now:",
        days = trip_days,
        destination = destination,
        budget = budget,
        interests = interests_str,
        context = prompt_context,
    )
}

/// How many of the requested days actually appear in the generated text.
fn count_days_covered(itinerary: &str, trip_days: u32) -> u32 {
    (1..=trip_days)
        .filter(|day| {
            itinerary.contains(&format!("Day {}", day))
                || itinerary.contains(&format!("**Day {}**", day))
        })
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format_validation() {
        assert!(PlannerService::valid_key_format(
            "gsk_0123456789abcdef0123456789abcdef"
        ));
        assert!(!PlannerService::valid_key_format("sk-not-a-groq-key-000000000000"));
        assert!(!PlannerService::valid_key_format("gsk_short"));
        assert!(!PlannerService::valid_key_format(""));
    }

    #[test]
    fn test_count_days_covered() {
        let text = "Day 1: arrive\nDay 2: museums\nDay 3: depart";
        assert_eq!(count_days_covered(text, 3), 3);
        assert_eq!(count_days_covered(text, 5), 3);
        assert_eq!(count_days_covered("nothing here", 2), 0);
    }

    #[test]
    fn test_prompt_includes_context_block() {
        let prompt = build_prompt(
            "Lisbon",
            4,
            BudgetTier::Budget,
            &["food".to_string(), "history".to_string()],
            "EXTRA CONTEXT LINE",
        );
        assert!(prompt.contains("4-day itinerary for Lisbon"));
        assert!(prompt.contains("Budget Level: Budget"));
        assert!(prompt.contains("food, history"));
        assert!(prompt.contains("EXTRA CONTEXT LINE"));
    }
}
