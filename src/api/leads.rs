// src/api/leads.rs
use crate::api::ApiResponse;
use crate::database::{lead_from_row, StoredLead, LEAD_COLUMNS};
use crate::server::ServerState;
use rocket::serde::Serialize;
use rocket::{get, serde::json::Json, State};

#[derive(Serialize)]
pub struct LeadsResponse {
    pub leads: Vec<StoredLead>,
    pub total_count: usize,
    pub page: usize,
    pub per_page: usize,
}

#[get("/leads?<page>&<per_page>&<verified_status>")]
pub async fn get_leads(
    state: &State<ServerState>,
    page: Option<usize>,
    per_page: Option<usize>,
    verified_status: Option<String>,
) -> Json<ApiResponse<LeadsResponse>> {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(50).min(1000);
    let offset = (page - 1) * per_page;

    let conn = match state.db_pool.get().await {
        Ok(conn) => conn,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };

    let mut where_conditions: Vec<&str> = vec!["1=1"];
    let mut params = Vec::new();

    if let Some(status) = verified_status.as_deref() {
        where_conditions.push("verified_status = ?");
        params.push(status.to_string());
    }

    let where_clause = where_conditions.join(" AND ");

    let query = format!(
        "SELECT {}
         FROM leads
         WHERE {}
         ORDER BY scraped_at DESC, id DESC
         LIMIT {} OFFSET {}",
        LEAD_COLUMNS, where_clause, per_page, offset
    );

    let mut stmt = match conn.prepare(&query) {
        Ok(stmt) => stmt,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };

    let lead_iter =
        match stmt.query_map(rusqlite::params_from_iter(params.iter()), lead_from_row) {
            Ok(iter) => iter,
            Err(e) => return Json(ApiResponse::error(e.to_string())),
        };

    let mut leads = Vec::new();
    for result in lead_iter {
        match result {
            Ok(lead) => leads.push(lead),
            Err(e) => return Json(ApiResponse::error(e.to_string())),
        }
    }

    let len = leads.len();

    Json(ApiResponse::success(LeadsResponse {
        leads,
        total_count: len,
        page,
        per_page,
    }))
}
