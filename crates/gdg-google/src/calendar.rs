//! Google Calendar API client

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use gdg_core::config::GoogleConfig;
use gdg_core::error::{Error, Result};
use gdg_core::tool::{Attendee, CalendarEvent, CalendarSource};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Google Calendar events client (API-key authenticated, read-only)
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: Client,
    api_key: String,
    calendar_id: String,
    base_url: String,
}

impl CalendarClient {
    /// Create a new calendar client
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            calendar_id: config.calendar_id.clone(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (for tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn list_events(
        &self,
        time_min: chrono::DateTime<Utc>,
        time_max: chrono::DateTime<Utc>,
        max_results: Option<u32>,
        query: Option<&str>,
    ) -> Result<Vec<CalendarEvent>> {
        let url = format!("{}/calendars/{}/events", self.base_url, self.calendar_id);

        let mut params = vec![
            ("key".to_string(), self.api_key.clone()),
            ("timeMin".to_string(), time_min.to_rfc3339()),
            ("timeMax".to_string(), time_max.to_rfc3339()),
            ("singleEvents".to_string(), "true".to_string()),
            ("orderBy".to_string(), "startTime".to_string()),
        ];
        if let Some(max) = max_results {
            params.push(("maxResults".to_string(), max.to_string()));
        }
        if let Some(q) = query {
            params.push(("q".to_string(), q.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(Error::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ToolExecution(format!(
                "Calendar API error: {} - {}",
                status, body
            )));
        }

        let list: EventsListResponse = response.json().await.map_err(Error::Http)?;
        Ok(list.items.into_iter().map(RawEvent::into_event).collect())
    }

    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.base_url, self.calendar_id, event_id
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
                "Calendar API error: {} - {}",
                status, body
            )));
        }

        let raw: RawEvent = response.json().await.map_err(Error::Http)?;
        Ok(raw.into_event())
    }
}

#[async_trait]
impl CalendarSource for CalendarClient {
    async fn upcoming_events(
        &self,
        max_results: u32,
        days_ahead: i64,
    ) -> Result<Vec<CalendarEvent>> {
        info!(max_results, days_ahead, "Fetching upcoming events");
        let now = Utc::now();
        let events = self
            .list_events(now, now + Duration::days(days_ahead), Some(max_results), None)
            .await?;
        info!("Found {} upcoming events", events.len());
        Ok(events)
    }

    async fn past_events(&self, max_results: u32, days_back: i64) -> Result<Vec<CalendarEvent>> {
        info!(max_results, days_back, "Fetching past events");
        let now = Utc::now();
        let events = self
            .list_events(now - Duration::days(days_back), now, Some(max_results), None)
            .await?;
        info!("Found {} past events", events.len());
        Ok(events)
    }

    async fn find_events(
        &self,
        event_id: Option<&str>,
        event_title: Option<&str>,
    ) -> Result<Vec<CalendarEvent>> {
        if let Some(id) = event_id {
            info!(event_id = %id, "Fetching event details by ID");
            return Ok(vec![self.get_event(id).await?]);
        }

        if let Some(title) = event_title {
            info!(title = %title, "Searching for event by title");
            let now = Utc::now();
            // Title search looks up to one year ahead.
            return self
                .list_events(now, now + Duration::days(365), None, Some(title))
                .await;
        }

        Err(Error::ToolExecution(
            "Either eventId or eventTitle must be provided".to_string(),
        ))
    }
}

#[derive(Debug, Deserialize)]
struct EventsListResponse {
    #[serde(default)]
    items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    #[serde(default)]
    id: String,
    summary: Option<String>,
    description: Option<String>,
    #[serde(default)]
    start: RawEventTime,
    #[serde(default)]
    end: RawEventTime,
    location: Option<String>,
    organizer: Option<RawOrganizer>,
    attendees: Option<Vec<RawAttendee>>,
    html_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl RawEventTime {
    fn value(&self) -> String {
        self.date_time
            .clone()
            .or_else(|| self.date.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrganizer {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAttendee {
    email: Option<String>,
    display_name: Option<String>,
    response_status: Option<String>,
}

impl RawEvent {
    fn into_event(self) -> CalendarEvent {
        let is_all_day = self.start.date_time.is_none();
        CalendarEvent {
            id: self.id,
            title: self
                .summary
                .unwrap_or_else(|| "Untitled Event".to_string()),
            description: self.description.unwrap_or_default(),
            start: self.start.value(),
            end: self.end.value(),
            location: self.location.unwrap_or_default(),
            organizer: self
                .organizer
                .and_then(|o| o.display_name)
                .unwrap_or_default(),
            attendees: self
                .attendees
                .unwrap_or_default()
                .into_iter()
                .map(|a| {
                    let email = a.email.unwrap_or_default();
                    Attendee {
                        name: a.display_name.clone().unwrap_or_else(|| email.clone()),
                        email,
                        response_status: a.response_status.unwrap_or_default(),
                    }
                })
                .collect(),
            is_all_day,
            html_link: self.html_link.unwrap_or_default(),
        }
    }
}
