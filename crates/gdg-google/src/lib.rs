//! gdg-google: Google Calendar and Sheets adapters
//!
//! Read-only REST clients backing the tool set: events come from a Google
//! Calendar, FAQs and speaker bios from a Google Sheet.

pub mod calendar;
pub mod sheets;

pub use calendar::CalendarClient;
pub use sheets::SheetsClient;
