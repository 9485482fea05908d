use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde_json::json;

use crate::routes::AppState;

/*
    GET /api/stats
*/
pub async fn get_stats(data: web::Data<AppState>) -> impl Responder {
    match data.system.get_statistics().await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(err) => {
            error!("Failed to compute statistics: {}", err);
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to compute statistics"
            }))
        }
    }
}
