//! Data-source traits backing the tool set
//!
//! All registered tools are read-only lookups against two sources: a
//! calendar (events) and a spreadsheet (FAQs, speakers). The traits keep
//! the registry independent of the concrete Google clients and mockable in
//! tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A calendar event record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub location: String,
    pub organizer: String,
    pub attendees: Vec<Attendee>,
    pub is_all_day: bool,
    pub html_link: String,
}

/// An event attendee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    pub name: String,
    pub response_status: String,
}

/// A frequently-asked-question record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub category: String,
    pub question: String,
    pub answer: String,
    pub tags: String,
}

/// A speaker record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
    pub bio: String,
    pub expertise: String,
    pub contact: String,
    pub events: String,
    pub social: String,
}

/// Read-only calendar lookups
#[async_trait]
pub trait CalendarSource: Send + Sync {
    /// Events starting within the next `days_ahead` days, ordered by start
    async fn upcoming_events(&self, max_results: u32, days_ahead: i64)
    -> Result<Vec<CalendarEvent>>;

    /// Events that started within the last `days_back` days
    async fn past_events(&self, max_results: u32, days_back: i64) -> Result<Vec<CalendarEvent>>;

    /// Look up events by id or by free-text title search.
    ///
    /// Fails when neither argument is provided.
    async fn find_events(
        &self,
        event_id: Option<&str>,
        event_title: Option<&str>,
    ) -> Result<Vec<CalendarEvent>>;
}

/// Read-only spreadsheet lookups
#[async_trait]
pub trait SheetsSource: Send + Sync {
    /// FAQs, optionally filtered by category and/or free-text search term
    async fn faqs(&self, category: Option<&str>, search_term: Option<&str>) -> Result<Vec<Faq>>;

    /// Speakers, optionally filtered by name and/or associated event id
    async fn speakers(
        &self,
        speaker_name: Option<&str>,
        event_id: Option<&str>,
    ) -> Result<Vec<Speaker>>;
}
