use crate::config::ScrapingConfig;
use crate::scraping::lead_extractor::LeadExtractor;
use crate::scraping::types::{ScrapeOutcome, ScrapedLead};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

/// Fetches company team/about pages and extracts leads from them.
pub struct TeamPageScraper {
    client: Client,
    extractor: LeadExtractor,
    batch_delay_ms: u64,
}

impl TeamPageScraper {
    pub fn new(config: &ScrapingConfig) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            extractor: LeadExtractor::new(),
            batch_delay_ms: config.batch_delay_ms,
        }
    }

    /// Scrapes a single team/about page for leads.
    pub async fn scrape_team_page(
        &self,
        url: &str,
    ) -> Result<Vec<ScrapedLead>, Box<dyn std::error::Error + Send + Sync>> {
        let domain = Self::domain_of(url)?;
        let html = self.fetch_page(url).await?;
        let leads = self.extractor.extract_leads(&html, &domain);

        info!("🎯 Scraped {}: {} leads found", url, leads.len());
        Ok(leads)
    }

    /// Scrapes each URL independently, with a delay between fetches. A
    /// failing URL is recorded in its outcome and never aborts the batch.
    pub async fn scrape_batch(&self, urls: &[String]) -> Vec<ScrapeOutcome> {
        let mut outcomes = Vec::with_capacity(urls.len());

        info!("🚀 Starting batch scrape of {} URLs", urls.len());

        for (i, url) in urls.iter().enumerate() {
            debug!("Scraping URL {}/{}: {}", i + 1, urls.len(), url);
            let start = Instant::now();

            let outcome = match self.scrape_team_page(url).await {
                Ok(leads) => ScrapeOutcome {
                    url: url.clone(),
                    duration_ms: start.elapsed().as_millis() as u64,
                    success: true,
                    error_message: None,
                    leads,
                },
                Err(e) => {
                    error!("❌ Failed to scrape {}: {}", url, e);
                    ScrapeOutcome {
                        url: url.clone(),
                        leads: Vec::new(),
                        duration_ms: start.elapsed().as_millis() as u64,
                        success: false,
                        error_message: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);

            // Rate limiting between URLs
            if i < urls.len() - 1 {
                tokio::time::sleep(Duration::from_millis(self.batch_delay_ms)).await;
            }
        }

        info!(
            "🏁 Batch scrape complete: {}/{} successful",
            outcomes.iter().filter(|o| o.success).count(),
            urls.len()
        );

        outcomes
    }

    async fn fetch_page(
        &self,
        url: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(format!("HTTP error: {}", response.status()).into());
        }

        let html = response.text().await?;
        debug!("Fetched {} bytes from {}", html.len(), url);

        Ok(html)
    }

    // The page's host doubles as the company identifier and email domain.
    fn domain_of(url: &str) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let parsed = Url::parse(url)?;
        match parsed.host_str() {
            Some(host) => Ok(host.to_string()),
            None => {
                warn!("URL has no host: {}", url);
                Err(format!("URL has no host: {}", url).into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_of_keeps_full_host() {
        assert_eq!(
            TeamPageScraper::domain_of("https://www.acme.io/about/").unwrap(),
            "www.acme.io"
        );
    }

    #[test]
    fn domain_of_rejects_invalid_urls() {
        assert!(TeamPageScraper::domain_of("not-a-url").is_err());
        assert!(TeamPageScraper::domain_of("mailto:joe@acme.io").is_err());
    }
}
