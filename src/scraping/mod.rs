pub mod lead_extractor;
pub mod scraper;
pub mod types;

pub use scraper::TeamPageScraper;
