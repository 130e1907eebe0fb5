mod context;
pub mod google_calendar;

pub use context::{Context, SERVICE_KEY};
pub use google_calendar::{CalendarService, Operation, Output};
