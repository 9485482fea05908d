use actix_web::{middleware::Logger, web, App};
use tempfile::TempDir;

use wayfarer_api::models::itinerary::{BudgetTier, NewItinerary};
use wayfarer_api::routes::{self, AppState};
use wayfarer_api::services::image_service::ImageService;
use wayfarer_api::services::planner_service::PlannerService;
use wayfarer_api::services::storage::dual::DualStorage;
use wayfarer_api::services::storage::json_store::JsonStore;
use wayfarer_api::services::training_service::PatternStore;
use wayfarer_api::services::travel_system::TravelSystem;

/// JSON-only system in a throwaway data directory. The Groq base URL points
/// at an unreachable port so upstream failures are deterministic and no test
/// ever leaves the machine.
pub struct TestApp {
    pub state: web::Data<AppState>,
    data_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        std::env::set_var("GROQ_API_KEY", "gsk_test0123456789abcdef0123456789abcdef");
        std::env::set_var("GROQ_BASE_URL", "http://127.0.0.1:9");
        std::env::remove_var("UNSPLASH_ACCESS_KEY");

        let data_dir = TempDir::new().expect("temp data dir");
        let backup = JsonStore::new(data_dir.path()).expect("json store");
        let patterns = PatternStore::new(data_dir.path()).expect("pattern store");
        let system = TravelSystem::new(DualStorage::new(None, backup), patterns);

        let state = web::Data::new(AppState {
            system,
            planner: PlannerService::from_env().expect("planner from env"),
            images: ImageService::from_env(),
        });

        Self { state, data_dir }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(Logger::default())
            .app_data(self.state.clone())
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
    }

    /// Seeds a stored itinerary directly, standing in for the external
    /// generation call.
    pub async fn seed_itinerary(&self, destination: &str, days: u32, text: &str) -> i64 {
        self.state
            .system
            .store_itinerary(NewItinerary::new(
                destination.to_string(),
                days,
                BudgetTier::Moderate,
                vec!["food".to_string()],
                vec!["Solo".to_string()],
                true,
                true,
                "seeded context".to_string(),
                text.to_string(),
            ))
            .await
    }

    /// The pattern document as raw JSON, read straight off disk.
    pub fn pattern_document(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(self.data_dir.path().join("training_patterns.json"))
            .expect("pattern file");
        serde_json::from_str(&raw).expect("pattern json")
    }
}
