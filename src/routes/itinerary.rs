use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::models::itinerary::{
    title_case, NewItinerary, TripRequest, MAX_TRIP_DAYS, MIN_TRIP_DAYS,
};
use crate::routes::AppState;
use crate::services::sanitizer::sanitize_destination;

/*
    POST /api/itineraries/generate
*/
pub async fn generate(
    body: web::Json<TripRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let request = body.into_inner();

    let destination = sanitize_destination(&request.destination);
    if destination.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Please enter a valid destination"
        }));
    }

    let trip_days = request.trip_days.clamp(MIN_TRIP_DAYS, MAX_TRIP_DAYS);
    let interests = if request.interests.is_empty() {
        vec!["Everything".to_string()]
    } else {
        request.interests.clone()
    };

    let prompt_context =
        data.system
            .enhanced_prompt_context(&destination, trip_days, request.budget, &interests);

    let start = Instant::now();
    let itinerary_text = match data
        .planner
        .create_itinerary(&destination, trip_days, request.budget, &interests, &prompt_context)
        .await
    {
        Ok(text) => text,
        Err(err) => {
            error!("Itinerary generation failed for {}: {}", destination, err);
            // No automatic retry; the user has to resubmit.
            return HttpResponse::BadGateway().json(json!({
                "error": "Unable to generate itinerary. Please try again."
            }));
        }
    };
    let generation_time_ms = start.elapsed().as_millis() as u64;

    let id = data
        .system
        .store_itinerary(NewItinerary::new(
            destination.clone(),
            trip_days,
            request.budget,
            interests,
            request.travel_style,
            request.include_food,
            request.include_transport,
            prompt_context,
            itinerary_text.clone(),
        ))
        .await;

    HttpResponse::Ok().json(json!({
        "id": id,
        "destination": title_case(&destination),
        "trip_days": trip_days,
        "budget": request.budget,
        "itinerary": itinerary_text,
        "generation_time_ms": generation_time_ms,
    }))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i64,
    #[serde(default)]
    pub comments: String,
}

/*
    POST /api/itineraries/{id}/feedback

    Never fails on storage errors; out-of-range ratings are clamped.
*/
pub async fn feedback(
    path: web::Path<i64>,
    body: web::Json<FeedbackRequest>,
    data: web::Data<AppState>,
) -> impl Responder {
    let itinerary_id = path.into_inner();
    data.system
        .record_feedback(itinerary_id, body.rating, &body.comments)
        .await;

    HttpResponse::Ok().json(json!({ "status": "recorded", "id": itinerary_id }))
}

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

/*
    GET /api/itineraries/recent?limit=10
*/
pub async fn recent(query: web::Query<RecentQuery>, data: web::Data<AppState>) -> impl Responder {
    let limit = query.limit.unwrap_or(10);

    match data.system.get_recent_itineraries(limit).await {
        Ok(records) => HttpResponse::Ok().json(records),
        Err(err) => {
            error!("Failed to list recent itineraries: {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to retrieve itineraries"
            }))
        }
    }
}
