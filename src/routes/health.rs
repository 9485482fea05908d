use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::routes::AppState;
use crate::services::planner_service::PlannerService;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let groq = check_groq_key();
    health.services.insert("groq".to_string(), groq.clone());

    let storage = ServiceStatus {
        status: "ok".to_string(),
        details: Some(if data.system.has_primary() {
            "Dual storage: PostgreSQL + JSON backup".to_string()
        } else {
            "JSON storage only".to_string()
        }),
    };
    health.services.insert("storage".to_string(), storage);

    let images = ServiceStatus {
        status: "ok".to_string(),
        details: Some(if data.images.is_configured() {
            "Unsplash access key configured".to_string()
        } else {
            "UNSPLASH_ACCESS_KEY not set, photo gallery disabled".to_string()
        }),
    };
    health.services.insert("images".to_string(), images);

    if groq.status != "ok" {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

fn check_groq_key() -> ServiceStatus {
    match env::var("GROQ_API_KEY") {
        Ok(key) if PlannerService::valid_key_format(&key) => {
            let masked_key = format!("{}***{}", &key[0..4], &key[key.len() - 4..]);
            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("Groq API key configured ({})", masked_key)),
            }
        }
        Ok(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some("GROQ_API_KEY has unexpected format".to_string()),
        },
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some("GROQ_API_KEY not configured".to_string()),
        },
    }
}
