//! Conversation orchestrator
//!
//! Runs one full message-in/reply-out cycle: resolve the session, request a
//! completion, execute at most one round of function calls, and return the
//! final text. Faults never escape: the caller always gets either a real
//! reply or the fixed fallback text.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::Result;
use crate::llm::{ChatModel, Content};
use crate::session::SessionStore;
use crate::tool::ToolRegistry;

/// Persona and guidelines sent as the system instruction on every request.
pub const SYSTEM_PROMPT: &str = "You are GDG Event Assistant, a helpful and friendly WhatsApp chatbot for Google Developer Groups (GDG) communities.\n\n\
Your role is to:\n\
- Provide accurate information about upcoming and past GDG events\n\
- Answer questions about speakers, schedules, and event details\n\
- Help users find relevant information from the community's knowledge base\n\
- Maintain a conversational, helpful tone while being informative\n\
- Use the available functions to fetch real-time data when needed\n\n\
Key guidelines:\n\
- Always be friendly and welcoming to GDG community members\n\
- Provide specific, actionable information when possible\n\
- If you don't have information about something, be honest about it\n\
- Encourage community participation and engagement\n\
- Use emojis sparingly but appropriately to keep the conversation engaging\n\
- Keep responses concise but informative for WhatsApp messaging\n\n\
Remember: You're helping to build and support a vibrant developer community!";

/// Reply used whenever a cycle hits an unrecoverable fault.
pub const FALLBACK_REPLY: &str = "I'm sorry, I'm having trouble processing your request right now. \
Please try again in a moment, or contact the GDG team if the issue persists. 🤖";

/// One round of function calls per user message. The completion that follows
/// the tool round must be text; further calls it requests are dropped.
const MAX_TOOL_ROUNDS: usize = 1;

/// Executes one conversation cycle per inbound message
pub struct ChatOrchestrator {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    sessions: Arc<SessionStore>,
}

impl ChatOrchestrator {
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry, sessions: Arc<SessionStore>) -> Self {
        Self {
            model,
            tools,
            sessions,
        }
    }

    /// The session store shared with the webhook layer
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one inbound message and produce the reply text.
    ///
    /// Never fails: unrecoverable faults yield [`FALLBACK_REPLY`], leaving
    /// the session history in whatever state it reached.
    pub async fn reply(&self, user_key: &str, text: &str) -> String {
        match self.run_cycle(user_key, text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user = %user_key, "Error processing message: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn run_cycle(&self, user_key: &str, text: &str) -> Result<String> {
        info!(user = %user_key, "Processing message");

        let session = self.sessions.get_or_create(user_key).await;
        // Held for the whole cycle: concurrent messages from the same user
        // serialize here.
        let mut session = session.lock().await;

        session.push_turn(Content::user(text));

        let declarations = self.tools.declarations();
        let mut completion = self
            .model
            .complete(session.turns.clone(), &declarations)
            .await?;

        let mut rounds = 0;
        while completion.has_function_calls() && rounds < MAX_TOOL_ROUNDS {
            rounds += 1;
            info!(count = completion.function_calls.len(), "Function calls requested");

            for call in &completion.function_calls {
                let outcome = self.tools.execute(call).await;
                session.push_turn(Content::tool_result(&call.name, outcome));
            }

            completion = self
                .model
                .complete(session.turns.clone(), &declarations)
                .await?;
        }

        if completion.has_function_calls() {
            warn!("Model requested further function calls after the tool round; dropping them");
        }

        let reply = completion.text;
        session.push_turn(Content::model(&reply));
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::{Completion, FunctionCall, FunctionDeclaration};
    use crate::tool::{CalendarEvent, CalendarSource, Faq, SheetsSource, Speaker};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Model stub replaying a fixed sequence of completion outcomes
    struct ScriptedModel {
        script: Mutex<VecDeque<crate::Result<Completion>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(script: Vec<crate::Result<Completion>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            _contents: Vec<Content>,
            _tools: &[FunctionDeclaration],
        ) -> crate::Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(Completion::text_only("out of script")))
        }
    }

    struct StubCalendar {
        fail: bool,
    }

    #[async_trait]
    impl CalendarSource for StubCalendar {
        async fn upcoming_events(&self, _: u32, _: i64) -> crate::Result<Vec<CalendarEvent>> {
            if self.fail {
                return Err(Error::ToolExecution("calendar backend unreachable".into()));
            }
            Ok(vec![
                CalendarEvent {
                    id: "evt1".into(),
                    title: "DevFest".into(),
                    description: "Annual conference".into(),
                    start: "2026-09-12T09:00:00Z".into(),
                    end: "2026-09-12T18:00:00Z".into(),
                    location: "Tech Hub".into(),
                    organizer: "GDG".into(),
                    attendees: Vec::new(),
                    is_all_day: false,
                    html_link: "https://calendar.google.com/evt1".into(),
                },
                CalendarEvent {
                    id: "evt2".into(),
                    title: "Study Jam".into(),
                    description: String::new(),
                    start: "2026-09-20T18:00:00Z".into(),
                    end: "2026-09-20T20:00:00Z".into(),
                    location: String::new(),
                    organizer: String::new(),
                    attendees: Vec::new(),
                    is_all_day: false,
                    html_link: "https://calendar.google.com/evt2".into(),
                },
            ])
        }

        async fn past_events(&self, _: u32, _: i64) -> crate::Result<Vec<CalendarEvent>> {
            Ok(Vec::new())
        }

        async fn find_events(
            &self,
            _: Option<&str>,
            _: Option<&str>,
        ) -> crate::Result<Vec<CalendarEvent>> {
            Ok(Vec::new())
        }
    }

    struct StubSheets;

    #[async_trait]
    impl SheetsSource for StubSheets {
        async fn faqs(&self, _: Option<&str>, _: Option<&str>) -> crate::Result<Vec<Faq>> {
            Ok(Vec::new())
        }

        async fn speakers(&self, _: Option<&str>, _: Option<&str>) -> crate::Result<Vec<Speaker>> {
            Ok(Vec::new())
        }
    }

    fn orchestrator(
        model: Arc<ScriptedModel>,
        calendar_fails: bool,
    ) -> (ChatOrchestrator, Arc<SessionStore>) {
        let sessions = Arc::new(SessionStore::new());
        let tools = ToolRegistry::new(
            Arc::new(StubCalendar {
                fail: calendar_fails,
            }),
            Arc::new(StubSheets),
        );
        (
            ChatOrchestrator::new(model, tools, Arc::clone(&sessions)),
            sessions,
        )
    }

    fn tool_call_completion(name: &str, args: serde_json::Value) -> Completion {
        Completion {
            text: String::new(),
            function_calls: vec![FunctionCall {
                name: name.to_string(),
                args,
            }],
        }
    }

    #[tokio::test]
    async fn test_plain_cycle_grows_history_by_two() {
        let model = ScriptedModel::new(vec![Ok(Completion::text_only("Hello! How can I help?"))]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        let reply = orchestrator.reply("+123", "hi there").await;

        assert_eq!(reply, "Hello! How can I help?");
        let history = sessions.history("+123").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "model");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tool_cycle_grows_history_by_two_plus_n() {
        let model = ScriptedModel::new(vec![
            Ok(tool_call_completion(
                "get_upcoming_events",
                json!({"maxResults": 5, "daysAhead": 30}),
            )),
            Ok(Completion::text_only("Two events coming up: DevFest and Study Jam!")),
        ]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        let reply = orchestrator.reply("+123", "What events are coming up?").await;

        assert_eq!(reply, "Two events coming up: DevFest and Study Jam!");
        assert_eq!(model.call_count(), 2);

        // user + 1 tool result + model
        let history = sessions.history("+123").await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[1].role, "tool");
        assert_eq!(history[2].role, "model");
    }

    #[tokio::test]
    async fn test_multiple_tool_calls_preserve_order() {
        let model = ScriptedModel::new(vec![
            Ok(Completion {
                text: String::new(),
                function_calls: vec![
                    FunctionCall {
                        name: "get_upcoming_events".into(),
                        args: json!({}),
                    },
                    FunctionCall {
                        name: "get_faqs".into(),
                        args: json!({"searchTerm": "join"}),
                    },
                ],
            }),
            Ok(Completion::text_only("Here's everything I found.")),
        ]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        orchestrator.reply("+123", "events and how to join?").await;

        let history = sessions.history("+123").await;
        assert_eq!(history.len(), 4);
        let first_result = &history[1].parts[0];
        let second_result = &history[2].parts[0];
        match (first_result, second_result) {
            (
                crate::llm::Part::FunctionResponse(a),
                crate::llm::Part::FunctionResponse(b),
            ) => {
                assert_eq!(a.name, "get_upcoming_events");
                assert_eq!(b.name, "get_faqs");
            }
            other => panic!("expected function responses, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_function_does_not_abort_cycle() {
        let model = ScriptedModel::new(vec![
            Ok(tool_call_completion("summon_dragon", json!({}))),
            Ok(Completion::text_only("I couldn't do that, sorry!")),
        ]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        let reply = orchestrator.reply("+123", "do magic").await;

        assert_eq!(reply, "I couldn't do that, sorry!");
        let history = sessions.history("+123").await;
        let crate::llm::Part::FunctionResponse(result) = &history[1].parts[0] else {
            panic!("expected a function response turn");
        };
        assert_eq!(result.response["success"], json!(false));
        assert_eq!(result.response["error"], json!("Unknown function: summon_dragon"));
    }

    #[tokio::test]
    async fn test_tool_fault_still_produces_reply() {
        let model = ScriptedModel::new(vec![
            Ok(tool_call_completion("get_upcoming_events", json!({}))),
            Ok(Completion::text_only("I couldn't reach the calendar right now.")),
        ]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), true);

        let reply = orchestrator.reply("+123", "What's on?").await;

        assert_eq!(reply, "I couldn't reach the calendar right now.");
        let history = sessions.history("+123").await;
        let crate::llm::Part::FunctionResponse(result) = &history[1].parts[0] else {
            panic!("expected a function response turn");
        };
        assert_eq!(result.response["success"], json!(false));
        assert!(
            result.response["error"]
                .as_str()
                .unwrap()
                .contains("calendar backend unreachable")
        );
    }

    #[tokio::test]
    async fn test_model_fault_returns_fallback_without_second_attempt() {
        let model = ScriptedModel::new(vec![Err(Error::GeminiApi("503: overloaded".into()))]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        let reply = orchestrator.reply("+123", "hello?").await;

        assert_eq!(reply, FALLBACK_REPLY);
        assert_eq!(model.call_count(), 1);
        // No rollback: the user turn stays in the session.
        let history = sessions.history("+123").await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, "user");
    }

    #[tokio::test]
    async fn test_second_completion_tool_calls_are_dropped() {
        let model = ScriptedModel::new(vec![
            Ok(tool_call_completion("get_upcoming_events", json!({}))),
            Ok(Completion {
                text: "Partial answer".into(),
                function_calls: vec![FunctionCall {
                    name: "get_faqs".into(),
                    args: json!({}),
                }],
            }),
        ]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        let reply = orchestrator.reply("+123", "events?").await;

        // One round only: the text is used, the extra call is never executed.
        assert_eq!(reply, "Partial answer");
        assert_eq!(model.call_count(), 2);
        assert_eq!(sessions.history("+123").await.len(), 3);
    }

    #[tokio::test]
    async fn test_history_accumulates_across_cycles() {
        let model = ScriptedModel::new(vec![
            Ok(Completion::text_only("Hi!")),
            Ok(Completion::text_only("Yes, we meet monthly.")),
        ]);
        let (orchestrator, sessions) = orchestrator(Arc::clone(&model), false);

        orchestrator.reply("+123", "hello there bot").await;
        orchestrator.reply("+123", "do you meet often?").await;

        assert_eq!(sessions.history("+123").await.len(), 4);
        assert_eq!(sessions.stats().await.active_sessions, 1);
    }
}
