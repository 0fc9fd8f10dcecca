// src/server/routes.rs
pub mod health {
    use crate::database::check_connectivity;
    use crate::models::SERVICE_NAME;
    use crate::server::ServerState;
    use rocket::{get, serde::json::Json, State};
    use serde_json::{json, Value};
    use tracing::error;

    #[get("/health")]
    pub async fn health_check(state: &State<ServerState>) -> Json<Value> {
        match check_connectivity(&state.db_pool).await {
            Ok(()) => Json(json!({
                "status": "ok",
                "database": "connected",
                "service": SERVICE_NAME,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
            Err(e) => {
                error!("Health check could not reach database: {}", e);
                Json(json!({
                    "status": "degraded",
                    "database": "unavailable",
                    "service": SERVICE_NAME,
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                }))
            }
        }
    }

    #[get("/")]
    pub async fn index() -> Json<Value> {
        Json(json!({
            "message": "ScraprIQ API is running!",
            "version": "0.1.0",
            "description": "API for lead scraping and verification for OutBound IQ",
            "endpoints": {
                "scrape": "/scrapr-iq",
                "batch_scrape": "/batch-scrape-leads",
                "leads": "/leads",
                "health": "/health",
                "create_tables": "/create-tables"
            }
        }))
    }
}
