use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::models::itinerary::{title_case, MAX_TRIP_DAYS, MIN_TRIP_DAYS};
use crate::services::cost_service::estimate_trip_cost;
use crate::services::sanitizer::sanitize_destination;

#[derive(Debug, Deserialize)]
pub struct CostQuery {
    pub days: Option<u32>,
}

/*
    GET /api/costs/{city}?days=5
*/
pub async fn get_costs(path: web::Path<String>, query: web::Query<CostQuery>) -> impl Responder {
    let city = sanitize_destination(&path.into_inner());
    if city.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Please enter a valid destination"
        }));
    }

    let days = query
        .days
        .unwrap_or(1)
        .clamp(MIN_TRIP_DAYS, MAX_TRIP_DAYS);

    HttpResponse::Ok().json(json!({
        "city": title_case(&city),
        "days": days,
        "estimates": estimate_trip_cost(days),
        "maps_url": google_maps_link(&city),
    }))
}

fn google_maps_link(city: &str) -> String {
    format!(
        "https://www.google.com/maps/search/?api=1&query={}",
        city.replace(' ', "+")
    )
}
