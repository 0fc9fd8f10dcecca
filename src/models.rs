pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Status assigned to every lead at scrape time. Verification is a later,
/// separate step.
pub const STATUS_UNVERIFIED: &str = "UNVERIFIED";

pub const SERVICE_NAME: &str = "ScraprIQ Backend";
