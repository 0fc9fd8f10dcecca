// src/api/admin.rs
use crate::api::ApiResponse;
use crate::database;
use crate::server::ServerState;
use rocket::serde::Serialize;
use rocket::{post, serde::json::Json, State};
use tracing::warn;

#[derive(Serialize)]
pub struct CreateTablesResponse {
    pub tables: Vec<String>,
    pub message: String,
}

/// Destructive: drops and recreates every table. Intended for first-time
/// setup and for resetting throwaway environments.
#[post("/create-tables")]
pub async fn create_tables(
    state: &State<ServerState>,
) -> Json<ApiResponse<CreateTablesResponse>> {
    warn!("⚠️ /create-tables called: dropping and recreating schema");

    match database::recreate_tables(&state.db_pool).await {
        Ok(tables) => Json(ApiResponse::success(CreateTablesResponse {
            tables,
            message: "Schema dropped and recreated".to_string(),
        })),
        Err(e) => Json(ApiResponse::error(e.to_string())),
    }
}
