// src/api/scrape.rs
use crate::api::ApiResponse;
use crate::database::{self, StoredLead};
use crate::server::ServerState;
use rocket::serde::{Deserialize, Serialize};
use rocket::{post, serde::json::Json, State};
use std::time::Instant;
use tracing::warn;

#[derive(Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Deserialize)]
pub struct BatchScrapeRequest {
    pub urls: Vec<String>,
}

#[derive(Serialize)]
pub struct ScrapeResponse {
    pub url: String,
    pub leads: Vec<StoredLead>,
    pub leads_found: usize,
    pub duration_ms: u64,
}

#[derive(Serialize)]
pub struct BatchUrlOutcome {
    pub url: String,
    pub leads_found: usize,
    pub duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Serialize)]
pub struct BatchScrapeResponse {
    pub run_id: String,
    pub results: Vec<BatchUrlOutcome>,
    pub urls_processed: usize,
    pub successful: usize,
    pub total_leads_found: usize,
}

#[post("/scrapr-iq", data = "<request>")]
pub async fn scrape_leads(
    state: &State<ServerState>,
    request: Json<ScrapeRequest>,
) -> Json<ApiResponse<ScrapeResponse>> {
    let url = request.url.trim().to_string();
    if url.is_empty() {
        return Json(ApiResponse::error("Request contained no URL".to_string()));
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let start = Instant::now();

    let leads = match state.scraper.scrape_team_page(&url).await {
        Ok(leads) => leads,
        Err(e) => {
            record_run(state, &run_id, &url, 0, start, false, Some(&e.to_string())).await;
            return Json(ApiResponse::error(e.to_string()));
        }
    };

    let stored = match database::store_leads(&state.db_pool, &url, &leads).await {
        Ok(stored) => stored,
        Err(e) => return Json(ApiResponse::error(e.to_string())),
    };

    let duration_ms = start.elapsed().as_millis() as u64;
    record_run(state, &run_id, &url, stored.len(), start, true, None).await;

    Json(ApiResponse::success(ScrapeResponse {
        url,
        leads_found: stored.len(),
        leads: stored,
        duration_ms,
    }))
}

#[post("/batch-scrape-leads", data = "<request>")]
pub async fn batch_scrape_leads(
    state: &State<ServerState>,
    request: Json<BatchScrapeRequest>,
) -> Json<ApiResponse<BatchScrapeResponse>> {
    let urls: Vec<String> = request
        .urls
        .iter()
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .collect();

    if urls.is_empty() {
        return Json(ApiResponse::error("Request contained no URLs".to_string()));
    }

    let max_urls = state.config.scraping.max_urls_per_batch;
    if urls.len() > max_urls {
        return Json(ApiResponse::error(format!(
            "Batch too large: {} URLs (maximum is {})",
            urls.len(),
            max_urls
        )));
    }

    let run_id = uuid::Uuid::new_v4().to_string();
    let outcomes = state.scraper.scrape_batch(&urls).await;

    let mut results = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let result = if outcome.success {
            match database::store_leads(&state.db_pool, &outcome.url, &outcome.leads).await {
                Ok(stored) => BatchUrlOutcome {
                    url: outcome.url.clone(),
                    leads_found: stored.len(),
                    duration_ms: outcome.duration_ms,
                    success: true,
                    error_message: None,
                },
                Err(e) => BatchUrlOutcome {
                    url: outcome.url.clone(),
                    leads_found: 0,
                    duration_ms: outcome.duration_ms,
                    success: false,
                    error_message: Some(e.to_string()),
                },
            }
        } else {
            BatchUrlOutcome {
                url: outcome.url.clone(),
                leads_found: 0,
                duration_ms: outcome.duration_ms,
                success: false,
                error_message: outcome.error_message.clone(),
            }
        };

        if let Err(e) = database::record_scrape_run(
            &state.db_pool,
            &run_id,
            &result.url,
            result.leads_found,
            result.duration_ms,
            result.success,
            result.error_message.as_deref(),
        )
        .await
        {
            warn!("Failed to record scrape run for {}: {}", result.url, e);
        }

        results.push(result);
    }

    let successful = results.iter().filter(|r| r.success).count();
    let total_leads_found = results.iter().map(|r| r.leads_found).sum();

    Json(ApiResponse::success(BatchScrapeResponse {
        run_id,
        urls_processed: results.len(),
        successful,
        total_leads_found,
        results,
    }))
}

async fn record_run(
    state: &State<ServerState>,
    run_id: &str,
    url: &str,
    leads_found: usize,
    start: Instant,
    success: bool,
    error_message: Option<&str>,
) {
    let duration_ms = start.elapsed().as_millis() as u64;
    if let Err(e) = database::record_scrape_run(
        &state.db_pool,
        run_id,
        url,
        leads_found,
        duration_ms,
        success,
        error_message,
    )
    .await
    {
        warn!("Failed to record scrape run for {}: {}", url, e);
    }
}
