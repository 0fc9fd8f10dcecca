pub mod admin;
pub mod leads;
pub mod scrape;

use serde::Serialize;

// Re-export all route functions
pub use admin::*;
pub use leads::*;
pub use scrape::*;

/// Envelope every endpoint answers with.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}
