//! Tool registry: exhaustive dispatch over the closed tool set
//!
//! `execute` never fails. Unknown function names and handler faults both
//! come back as structured failure payloads so a single bad call can never
//! abort a conversation cycle.

use std::sync::Arc;

use serde_json::{Value as JsonValue, json};
use tracing::{debug, error};

use crate::Result;
use crate::error::Error;
use crate::llm::{FunctionCall, FunctionDeclaration};

use super::kind::{
    self, EventDetailsArgs, FaqArgs, PastEventsArgs, SpeakerArgs, ToolKind, UpcomingEventsArgs,
};
use super::traits::{CalendarSource, SheetsSource};

/// Registry wiring the declared tool set to its data sources
pub struct ToolRegistry {
    calendar: Arc<dyn CalendarSource>,
    sheets: Arc<dyn SheetsSource>,
}

impl ToolRegistry {
    pub fn new(calendar: Arc<dyn CalendarSource>, sheets: Arc<dyn SheetsSource>) -> Self {
        Self { calendar, sheets }
    }

    /// Declarations for the full tool set, passed to the model on each request
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        kind::declarations()
    }

    /// Execute one function call and return its outcome payload.
    ///
    /// Always returns a payload: failures are tagged `success: false` rather
    /// than propagated.
    pub async fn execute(&self, call: &FunctionCall) -> JsonValue {
        let Some(tool) = ToolKind::from_name(&call.name) else {
            error!(name = %call.name, "Model requested an undeclared function");
            return json!({
                "success": false,
                "error": format!("Unknown function: {}", call.name),
            });
        };

        debug!(name = %call.name, args = %call.args, "Executing function");

        // Models omit the args record entirely for parameterless calls.
        let args = if call.args.is_null() {
            json!({})
        } else {
            call.args.clone()
        };

        match self.run(tool, args).await {
            Ok(payload) => payload,
            Err(e) => {
                error!(name = %call.name, "Function execution failed: {}", e);
                json!({
                    "success": false,
                    "error": e.to_string(),
                    "message": format!("Failed to execute {}", call.name),
                })
            }
        }
    }

    async fn run(&self, tool: ToolKind, args: JsonValue) -> Result<JsonValue> {
        match tool {
            ToolKind::GetUpcomingEvents => {
                let args: UpcomingEventsArgs = parse_args(args)?;
                let events = self
                    .calendar
                    .upcoming_events(args.max_results, args.days_ahead)
                    .await?;
                let message = if events.is_empty() {
                    format!("No upcoming events found in the next {} days.", args.days_ahead)
                } else {
                    format!("Found {} upcoming events", events.len())
                };
                Ok(json!({
                    "success": true,
                    "message": message,
                    "events": events,
                }))
            }
            ToolKind::GetPastEvents => {
                let args: PastEventsArgs = parse_args(args)?;
                let events = self
                    .calendar
                    .past_events(args.max_results, args.days_back)
                    .await?;
                let message = if events.is_empty() {
                    format!("No past events found in the last {} days.", args.days_back)
                } else {
                    format!("Found {} past events", events.len())
                };
                Ok(json!({
                    "success": true,
                    "message": message,
                    "events": events,
                }))
            }
            ToolKind::GetEventDetails => {
                let args: EventDetailsArgs = parse_args(args)?;
                let events = self
                    .calendar
                    .find_events(args.event_id.as_deref(), args.event_title.as_deref())
                    .await?;

                if args.event_id.is_some() {
                    match events.into_iter().next() {
                        Some(event) => Ok(json!({
                            "success": true,
                            "message": "Event details retrieved successfully",
                            "event": event,
                        })),
                        None => Ok(json!({
                            "success": false,
                            "message": "Event not found",
                        })),
                    }
                } else {
                    let title = args.event_title.unwrap_or_default();
                    if events.is_empty() {
                        Ok(json!({
                            "success": false,
                            "message": format!("No events found matching \"{}\"", title),
                            "events": [],
                        }))
                    } else {
                        Ok(json!({
                            "success": true,
                            "message": format!("Found {} events matching \"{}\"", events.len(), title),
                            "events": events,
                        }))
                    }
                }
            }
            ToolKind::GetFaqs => {
                let args: FaqArgs = parse_args(args)?;
                let faqs = self
                    .sheets
                    .faqs(args.category.as_deref(), args.search_term.as_deref())
                    .await?;
                let message = if faqs.is_empty() {
                    "No FAQs found matching the criteria.".to_string()
                } else {
                    format!("Found {} FAQs", faqs.len())
                };
                Ok(json!({
                    "success": true,
                    "message": message,
                    "faqs": faqs,
                }))
            }
            ToolKind::GetSpeakerInfo => {
                let args: SpeakerArgs = parse_args(args)?;
                let speakers = self
                    .sheets
                    .speakers(args.speaker_name.as_deref(), args.event_id.as_deref())
                    .await?;
                let message = if speakers.is_empty() {
                    "No speakers found matching the criteria.".to_string()
                } else {
                    format!("Found {} speakers", speakers.len())
                };
                Ok(json!({
                    "success": true,
                    "message": message,
                    "speakers": speakers,
                }))
            }
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: JsonValue) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| Error::ToolExecution(format!("Invalid arguments: {}", e)))
}
