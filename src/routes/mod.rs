pub mod costs;
pub mod health;
pub mod images;
pub mod itinerary;
pub mod stats;

use crate::services::image_service::ImageService;
use crate::services::planner_service::PlannerService;
use crate::services::travel_system::TravelSystem;

/// Everything the handlers need, constructed once in main and injected via
/// `web::Data`.
pub struct AppState {
    pub system: TravelSystem,
    pub planner: PlannerService,
    pub images: ImageService,
}
