use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::routes::AppState;
use crate::services::sanitizer::sanitize_destination;

const PHOTO_COUNT: usize = 3;

/*
    GET /api/images/{city}

    Best-effort: an unconfigured or failing Unsplash lookup returns an empty
    list rather than an error.
*/
pub async fn get_images(path: web::Path<String>, data: web::Data<AppState>) -> impl Responder {
    let city = sanitize_destination(&path.into_inner());
    if city.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Please enter a valid destination"
        }));
    }

    let photos = data.images.destination_photos(&city, PHOTO_COUNT).await;
    HttpResponse::Ok().json(json!({
        "city": city,
        "photos": photos,
        "configured": data.images.is_configured(),
    }))
}
