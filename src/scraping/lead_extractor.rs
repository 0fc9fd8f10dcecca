// Heuristic extraction of people from company team/about pages. Names tend
// to live in h2/h3/h4 headings, with the job title in an adjacent element or
// somewhere inside the surrounding team-member container.
use crate::scraping::types::ScrapedLead;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

const TITLE_FALLBACK: &str = "N/A";
const EMAIL_FALLBACK: &str = "N/A";

pub struct LeadExtractor {
    first_name_regex: Regex,
    last_name_regex: Regex,
    heading_selector: Selector,
    title_candidate_selector: Selector,
}

impl LeadExtractor {
    pub fn new() -> Self {
        Self {
            first_name_regex: Regex::new(r"^(\w+)").unwrap(),
            last_name_regex: Regex::new(r"\s(\w+)$").unwrap(),
            heading_selector: Selector::parse("h2, h3, h4").unwrap(),
            title_candidate_selector: Selector::parse("p, div, span").unwrap(),
        }
    }

    /// Walks every heading in the document and turns the plausible-looking
    /// ones into leads. `domain` doubles as the company field (MVP behavior)
    /// and the email domain.
    pub fn extract_leads(&self, html: &str, domain: &str) -> Vec<ScrapedLead> {
        let document = Html::parse_document(html);
        let mut leads = Vec::new();

        for heading in document.select(&self.heading_selector) {
            let name = normalize_text(&heading.text().collect::<Vec<_>>().join(" "));

            if !looks_like_name(&name) {
                continue;
            }

            let job_title = self
                .title_from_sibling(&heading)
                .or_else(|| self.title_from_ancestors(&heading, &name))
                .unwrap_or_else(|| TITLE_FALLBACK.to_string());

            leads.push(ScrapedLead {
                inferred_email: self.infer_email(&name, domain),
                name,
                job_title,
                company: domain.to_string(),
            });
        }

        debug!("Extracted {} leads for domain {}", leads.len(), domain);
        leads
    }

    // Common pattern: <h3>Name</h3><p>Title</p>
    fn title_from_sibling(&self, heading: &ElementRef) -> Option<String> {
        let sibling = heading.next_siblings().find_map(ElementRef::wrap)?;
        let text = normalize_text(&sibling.text().collect::<Vec<_>>().join(" "));
        is_plausible_title(&text).then_some(text)
    }

    // Fallback: scan up to 3 enclosing team-member containers for any text
    // element that reads like a title.
    fn title_from_ancestors(&self, heading: &ElementRef, name: &str) -> Option<String> {
        heading
            .ancestors()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "div" && is_team_container(el))
            .take(3)
            .find_map(|container| {
                container
                    .select(&self.title_candidate_selector)
                    .find_map(|el| {
                        let text =
                            normalize_text(&el.text().collect::<Vec<_>>().join(" "));
                        (text != name && is_plausible_title(&text)).then_some(text)
                    })
            })
    }

    /// Infers `first.last@domain` from the name, falling back to
    /// `first@domain` when no last word can be isolated. Further permutations
    /// (first-initial + last, etc.) are a refinement step for later.
    pub fn infer_email(&self, name: &str, domain: &str) -> String {
        let first = self
            .first_name_regex
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase());
        let last = self
            .last_name_regex
            .captures(name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase());

        match (first, last) {
            (Some(first), Some(last)) => format!("{}.{}@{}", first, last, domain),
            (Some(first), None) => format!("{}@{}", first, domain),
            _ => EMAIL_FALLBACK.to_string(),
        }
    }
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Filters out headings that are unlikely to be person names ("Our Services",
// css fragments, very long text).
fn looks_like_name(text: &str) -> bool {
    !text.is_empty()
        && text.split_whitespace().count() >= 2
        && text.chars().count() <= 50
        && text.chars().next().is_some_and(|c| c.is_uppercase())
}

fn is_plausible_title(text: &str) -> bool {
    let len = text.chars().count();
    len > 5 && len < 100 && text.contains(' ') && !text.chars().all(|c| c.is_numeric())
}

fn is_team_container(el: &ElementRef) -> bool {
    el.value()
        .classes()
        .any(|c| matches!(c, "team" | "person" | "elementor-widget-wrap"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_and_sibling_title() {
        let html = r#"
            <html><body>
                <h3>John Smith</h3>
                <p>Chief Executive Officer</p>
            </body></html>
        "#;

        let leads = LeadExtractor::new().extract_leads(html, "acme.io");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].name, "John Smith");
        assert_eq!(leads[0].job_title, "Chief Executive Officer");
        assert_eq!(leads[0].company, "acme.io");
        assert_eq!(leads[0].inferred_email, "john.smith@acme.io");
    }

    #[test]
    fn finds_title_in_team_container_when_sibling_is_missing() {
        let html = r#"
            <div class="person">
                <div><h3>Jane Doe</h3></div>
                <p>Head of Marketing</p>
            </div>
        "#;

        let leads = LeadExtractor::new().extract_leads(html, "acme.io");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].job_title, "Head of Marketing");
    }

    #[test]
    fn title_defaults_when_nothing_plausible_nearby() {
        let html = "<h2>Jane Doe</h2>";

        let leads = LeadExtractor::new().extract_leads(html, "acme.io");
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].job_title, "N/A");
    }

    #[test]
    fn skips_headings_that_cannot_be_names() {
        let html = r#"
            <h2>Pricing</h2>
            <h3>our team members</h3>
            <h4>This heading is way too long to plausibly be the name of a single human being anywhere</h4>
        "#;

        let leads = LeadExtractor::new().extract_leads(html, "acme.io");
        assert!(leads.is_empty());
    }

    #[test]
    fn ignores_purely_numeric_sibling_text() {
        let html = r#"
            <h3>John Smith</h3>
            <span>2024</span>
        "#;

        let leads = LeadExtractor::new().extract_leads(html, "acme.io");
        assert_eq!(leads[0].job_title, "N/A");
    }

    #[test]
    fn email_uses_first_and_last_word() {
        let extractor = LeadExtractor::new();
        assert_eq!(
            extractor.infer_email("Mary Jane Watson", "daily.com"),
            "mary.watson@daily.com"
        );
    }

    #[test]
    fn email_falls_back_to_first_name_only() {
        let extractor = LeadExtractor::new();
        // Trailing punctuation defeats the last-word pattern
        assert_eq!(
            extractor.infer_email("John Smith.", "acme.io"),
            "john@acme.io"
        );
    }
}
