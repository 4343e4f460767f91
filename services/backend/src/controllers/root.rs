use crate::models::song::HealthResponse;

pub struct RootController;

impl RootController {
    pub async fn health_check() -> HealthResponse {
        HealthResponse { status: "healthy" }
    }
}
