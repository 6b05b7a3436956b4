//! The closed tool set and its registry

mod kind;
mod registry;
mod traits;

pub use kind::{ToolKind, declarations};
pub use registry::ToolRegistry;
pub use traits::{Attendee, CalendarEvent, CalendarSource, Faq, SheetsSource, Speaker};
