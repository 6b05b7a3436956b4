//! Google Sheets API client
//!
//! The spreadsheet carries two sheets: `FAQs` (Category, Question, Answer,
//! Tags) and `Speakers` (Name, Bio, Expertise, Contact, Events, Social).
//! The first row is the header row and keys the record fields.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use gdg_core::config::GoogleConfig;
use gdg_core::error::{Error, Result};
use gdg_core::tool::{Faq, SheetsSource, Speaker};

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

const FAQ_RANGE: &str = "FAQs!A:D";
const SPEAKER_RANGE: &str = "Speakers!A:F";

/// Google Sheets values client (API-key authenticated, read-only)
#[derive(Debug, Clone)]
pub struct SheetsClient {
    client: Client,
    api_key: String,
    sheet_id: String,
    base_url: String,
}

impl SheetsClient {
    /// Create a new sheets client
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            sheet_id: config.sheet_id.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (for tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url, self.sheet_id, range
        );

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ToolExecution(format!(
                "Sheets API error: {} - {}",
                status, body
            )));
        }

        let values: ValuesResponse = response.json().await.map_err(Error::Http)?;
        Ok(values.values)
    }
}

#[async_trait]
impl SheetsSource for SheetsClient {
    async fn faqs(&self, category: Option<&str>, search_term: Option<&str>) -> Result<Vec<Faq>> {
        info!(?category, ?search_term, "Fetching FAQs");
        let rows = self.get_values(FAQ_RANGE).await?;
        let faqs = filter_faqs(parse_faq_rows(&rows), category, search_term);
        info!("Found {} FAQs", faqs.len());
        Ok(faqs)
    }

    async fn speakers(
        &self,
        speaker_name: Option<&str>,
        event_id: Option<&str>,
    ) -> Result<Vec<Speaker>> {
        info!(?speaker_name, ?event_id, "Fetching speaker info");
        let rows = self.get_values(SPEAKER_RANGE).await?;
        let speakers = filter_speakers(parse_speaker_rows(&rows), speaker_name, event_id);
        info!("Found {} speakers", speakers.len());
        Ok(speakers)
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Turn header-led rows into records keyed by lowercased header name
fn rows_to_records(rows: &[Vec<String>]) -> Vec<HashMap<String, String>> {
    let Some((headers, data)) = rows.split_first() else {
        return Vec::new();
    };

    data.iter()
        .map(|row| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    (
                        header.to_lowercase(),
                        row.get(i).cloned().unwrap_or_default(),
                    )
                })
                .collect()
        })
        .collect()
}

fn field(record: &HashMap<String, String>, name: &str) -> String {
    record.get(name).cloned().unwrap_or_default()
}

fn parse_faq_rows(rows: &[Vec<String>]) -> Vec<Faq> {
    rows_to_records(rows)
        .into_iter()
        .map(|record| Faq {
            category: field(&record, "category"),
            question: field(&record, "question"),
            answer: field(&record, "answer"),
            tags: field(&record, "tags"),
        })
        .collect()
}

fn parse_speaker_rows(rows: &[Vec<String>]) -> Vec<Speaker> {
    rows_to_records(rows)
        .into_iter()
        .map(|record| Speaker {
            name: field(&record, "name"),
            bio: field(&record, "bio"),
            expertise: field(&record, "expertise"),
            contact: field(&record, "contact"),
            events: field(&record, "events"),
            social: field(&record, "social"),
        })
        .collect()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn filter_faqs(faqs: Vec<Faq>, category: Option<&str>, search_term: Option<&str>) -> Vec<Faq> {
    faqs.into_iter()
        .filter(|faq| {
            category
                .map(|c| contains_ci(&faq.category, c))
                .unwrap_or(true)
        })
        .filter(|faq| {
            search_term
                .map(|term| {
                    contains_ci(&faq.question, term)
                        || contains_ci(&faq.answer, term)
                        || contains_ci(&faq.tags, term)
                })
                .unwrap_or(true)
        })
        .collect()
}

fn filter_speakers(
    speakers: Vec<Speaker>,
    speaker_name: Option<&str>,
    event_id: Option<&str>,
) -> Vec<Speaker> {
    speakers
        .into_iter()
        .filter(|speaker| {
            speaker_name
                .map(|name| contains_ci(&speaker.name, name))
                .unwrap_or(true)
        })
        .filter(|speaker| {
            // Event associations are an id list; matched verbatim.
            event_id
                .map(|id| speaker.events.contains(id))
                .unwrap_or(true)
        })
        .collect()
}
