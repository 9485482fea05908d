use std::env;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use wayfarer_api::db;
use wayfarer_api::routes::{self, AppState};
use wayfarer_api::services::image_service::ImageService;
use wayfarer_api::services::planner_service::PlannerService;
use wayfarer_api::services::storage::dual::DualStorage;
use wayfarer_api::services::storage::json_store::JsonStore;
use wayfarer_api::services::storage::postgres_store::PostgresStore;
use wayfarer_api::services::training_service::PatternStore;
use wayfarer_api::services::travel_system::TravelSystem;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    // Misconfigured credentials are fatal; nothing is served without a key.
    let groq_key = env::var("GROQ_API_KEY").unwrap_or_default();
    if !PlannerService::valid_key_format(&groq_key) {
        eprintln!("Invalid or missing GROQ_API_KEY (expected format: gsk_...)");
        std::process::exit(1);
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));

    let use_postgres = env::var("USE_POSTGRES")
        .unwrap_or_else(|_| "true".to_string())
        .to_lowercase()
        == "true";

    // The primary backend is optional: connection failure degrades to
    // JSON-only storage instead of aborting startup.
    let primary = if use_postgres {
        match env::var("DATABASE_URL") {
            Ok(url) => match db::postgres::create_pg_pool(&url).await {
                Ok(pool) => {
                    println!("PostgreSQL connection established");
                    Some(PostgresStore::new(pool))
                }
                Err(err) => {
                    log::warn!("PostgreSQL unavailable, using JSON only: {}", err);
                    None
                }
            },
            Err(_) => {
                log::warn!("DATABASE_URL not set, using JSON only");
                None
            }
        }
    } else {
        None
    };

    let backup = JsonStore::new(&data_dir).expect("Failed to initialize JSON storage");
    let patterns = PatternStore::new(&data_dir).expect("Failed to initialize pattern store");
    let system = TravelSystem::new(DualStorage::new(primary, backup), patterns);

    system.startup_training().await;

    let planner = PlannerService::from_env().expect("GROQ_API_KEY must be set");
    let state = web::Data::new(AppState {
        system,
        planner,
        images: ImageService::from_env(),
    });

    println!("Attempting to bind to {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .app_data(state.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/itineraries")
                            .route("/generate", web::post().to(routes::itinerary::generate))
                            .route("/recent", web::get().to(routes::itinerary::recent))
                            .route(
                                "/{id}/feedback",
                                web::post().to(routes::itinerary::feedback),
                            ),
                    )
                    .route("/stats", web::get().to(routes::stats::get_stats))
                    .route("/costs/{city}", web::get().to(routes::costs::get_costs))
                    .route("/images/{city}", web::get().to(routes::images::get_images)),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
