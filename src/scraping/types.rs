use serde::{Deserialize, Serialize};

/// A lead as extracted from a team/about page, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedLead {
    pub name: String,
    pub job_title: String,
    pub company: String,
    pub inferred_email: String,
}

/// Per-URL result of a batch scrape. Failures are recorded here instead of
/// aborting the rest of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeOutcome {
    pub url: String,
    pub leads: Vec<ScrapedLead>,
    pub duration_ms: u64,
    pub success: bool,
    pub error_message: Option<String>,
}
