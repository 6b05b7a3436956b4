//! The closed set of tools the model may invoke
//!
//! Tools are a fixed enum rather than an open string-keyed map: dispatch is
//! an exhaustive match, and names outside the set resolve to a structured
//! unknown-function outcome instead of an error.

use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use crate::llm::FunctionDeclaration;

/// The tools declared to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    GetUpcomingEvents,
    GetEventDetails,
    GetPastEvents,
    GetFaqs,
    GetSpeakerInfo,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::GetUpcomingEvents,
        ToolKind::GetEventDetails,
        ToolKind::GetPastEvents,
        ToolKind::GetFaqs,
        ToolKind::GetSpeakerInfo,
    ];

    /// Resolve a tool by its declared name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "get_upcoming_events" => Some(ToolKind::GetUpcomingEvents),
            "get_event_details" => Some(ToolKind::GetEventDetails),
            "get_past_events" => Some(ToolKind::GetPastEvents),
            "get_faqs" => Some(ToolKind::GetFaqs),
            "get_speaker_info" => Some(ToolKind::GetSpeakerInfo),
            _ => None,
        }
    }

    /// The name declared to the model
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::GetUpcomingEvents => "get_upcoming_events",
            ToolKind::GetEventDetails => "get_event_details",
            ToolKind::GetPastEvents => "get_past_events",
            ToolKind::GetFaqs => "get_faqs",
            ToolKind::GetSpeakerInfo => "get_speaker_info",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::GetUpcomingEvents => "Get upcoming GDG events from the community calendar",
            ToolKind::GetEventDetails => "Get detailed information about a specific event",
            ToolKind::GetPastEvents => "Get information about past GDG events",
            ToolKind::GetFaqs => "Search the community FAQ database",
            ToolKind::GetSpeakerInfo => "Search for information about event speakers",
        }
    }

    /// JSON schema of the tool's parameters
    pub fn parameters(&self) -> JsonValue {
        match self {
            ToolKind::GetUpcomingEvents => json!({
                "type": "object",
                "properties": {
                    "maxResults": {
                        "type": "integer",
                        "description": "Maximum number of events to return (default: 5)"
                    },
                    "daysAhead": {
                        "type": "integer",
                        "description": "Number of days ahead to look for events (default: 30)"
                    }
                }
            }),
            ToolKind::GetEventDetails => json!({
                "type": "object",
                "properties": {
                    "eventId": {
                        "type": "string",
                        "description": "The ID of the specific event"
                    },
                    "eventTitle": {
                        "type": "string",
                        "description": "The title or name of the event to search for"
                    }
                }
            }),
            ToolKind::GetPastEvents => json!({
                "type": "object",
                "properties": {
                    "maxResults": {
                        "type": "integer",
                        "description": "Maximum number of events to return (default: 5)"
                    },
                    "daysBack": {
                        "type": "integer",
                        "description": "Number of days back to look for events (default: 90)"
                    }
                }
            }),
            ToolKind::GetFaqs => json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "description": "FAQ category to filter by"
                    },
                    "searchTerm": {
                        "type": "string",
                        "description": "Free-text term matched against question, answer and tags"
                    }
                }
            }),
            ToolKind::GetSpeakerInfo => json!({
                "type": "object",
                "properties": {
                    "speakerName": {
                        "type": "string",
                        "description": "Name (or part of the name) of the speaker"
                    },
                    "eventId": {
                        "type": "string",
                        "description": "Restrict to speakers associated with this event"
                    }
                }
            }),
        }
    }

    pub fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration::new(self.name(), self.description(), self.parameters())
    }
}

/// Declarations for the full tool set, in a stable order
pub fn declarations() -> Vec<FunctionDeclaration> {
    ToolKind::ALL.iter().map(|kind| kind.declaration()).collect()
}

/// Arguments for `get_upcoming_events`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingEventsArgs {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_days_ahead")]
    pub days_ahead: i64,
}

/// Arguments for `get_event_details`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetailsArgs {
    pub event_id: Option<String>,
    pub event_title: Option<String>,
}

/// Arguments for `get_past_events`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastEventsArgs {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_days_back")]
    pub days_back: i64,
}

/// Arguments for `get_faqs`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaqArgs {
    pub category: Option<String>,
    pub search_term: Option<String>,
}

/// Arguments for `get_speaker_info`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerArgs {
    pub speaker_name: Option<String>,
    pub event_id: Option<String>,
}

fn default_max_results() -> u32 {
    5
}

fn default_days_ahead() -> i64 {
    30
}

fn default_days_back() -> i64 {
    90
}
