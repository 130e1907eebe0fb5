pub mod auth;
pub mod calendars;
pub mod credentials;
pub mod events;
pub mod extract;
pub mod models;
mod service;
pub mod token;

pub use auth::{authenticate, build_service, AuthRequest};
pub use calendars::{get_calendar, list_calendars};
pub use events::{
    create_event, delete_event, get_event, get_events, modify_event, move_event, quick_add,
    search_events, update_attendees, CreateEventRequest, DeleteEventRequest, GetEventsRequest,
    ModifyEventRequest, MoveEventRequest, QuickAddRequest, SearchEventsRequest,
    UpdateAttendeesRequest, PRIMARY_CALENDAR,
};
pub use extract::{extract_event, ExtractedEvent};
pub use models::{
    Calendar, CalendarList, DeletionStatus, Event, EventList, EventSummary, EventsOutput,
};
pub use service::{CalendarService, GOOGLE_API_BASE_URL};

use crate::components::Context;
use crate::error::CalendarResult;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every unit a workflow can run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Authenticate(AuthRequest),
    GetEvents(GetEventsRequest),
    CreateEvent(CreateEventRequest),
    ModifyEvent(ModifyEventRequest),
    DeleteEvent(DeleteEventRequest),
    ListCalendars,
    GetCalendarDetails { calendar_id: String },
    QuickAdd(QuickAddRequest),
    SearchEvents(SearchEventsRequest),
    MoveEvent(MoveEventRequest),
    UpdateAttendees(UpdateAttendeesRequest),
    ExtractEvent { json: String },
}

/// Result of running one `Operation`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "output", content = "value", rename_all = "snake_case")]
pub enum Output {
    Authenticated,
    Events(EventsOutput),
    EventId(String),
    Deletion(DeletionStatus),
    Calendars(CalendarList),
    CalendarDetails(Calendar),
    SearchResults(EventList),
    MovedEvent(Event),
    Extracted(ExtractedEvent),
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Authenticate(_) => "authenticate",
            Operation::GetEvents(_) => "get_events",
            Operation::CreateEvent(_) => "create_event",
            Operation::ModifyEvent(_) => "modify_event",
            Operation::DeleteEvent(_) => "delete_event",
            Operation::ListCalendars => "list_calendars",
            Operation::GetCalendarDetails { .. } => "get_calendar_details",
            Operation::QuickAdd(_) => "quick_add",
            Operation::SearchEvents(_) => "search_events",
            Operation::MoveEvent(_) => "move_event",
            Operation::UpdateAttendees(_) => "update_attendees",
            Operation::ExtractEvent { .. } => "extract_event",
        }
    }

    /// Point steps that name no calendar at `calendar_id`
    pub fn default_calendar(&mut self, calendar_id: &str) {
        let slot = match self {
            Operation::GetEvents(r) => &mut r.calendar_id,
            Operation::CreateEvent(r) => &mut r.calendar_id,
            Operation::ModifyEvent(r) => &mut r.calendar_id,
            Operation::DeleteEvent(r) => &mut r.calendar_id,
            Operation::QuickAdd(r) => &mut r.calendar_id,
            Operation::SearchEvents(r) => &mut r.calendar_id,
            Operation::UpdateAttendees(r) => &mut r.calendar_id,
            _ => return,
        };
        if slot.as_deref().map_or(true, str::is_empty) {
            *slot = Some(calendar_id.to_string());
        }
    }

    /// Run the unit against the context's calendar service.
    ///
    /// `Authenticate` installs the service; `ExtractEvent` never touches it.
    pub async fn execute(&self, ctx: &mut Context) -> CalendarResult<Output> {
        debug!("Executing {}", self.name());

        match self {
            Operation::Authenticate(request) => {
                authenticate(ctx, request).await?;
                Ok(Output::Authenticated)
            }
            Operation::ExtractEvent { json } => Ok(Output::Extracted(extract_event(json)?)),
            Operation::GetEvents(request) => {
                Ok(Output::Events(get_events(ctx.service()?, request).await?))
            }
            Operation::CreateEvent(request) => {
                Ok(Output::EventId(create_event(ctx.service()?, request).await?))
            }
            Operation::ModifyEvent(request) => {
                Ok(Output::EventId(modify_event(ctx.service()?, request).await?))
            }
            Operation::DeleteEvent(request) => {
                Ok(Output::Deletion(delete_event(ctx.service()?, request).await?))
            }
            Operation::ListCalendars => Ok(Output::Calendars(list_calendars(ctx.service()?).await?)),
            Operation::GetCalendarDetails { calendar_id } => Ok(Output::CalendarDetails(
                get_calendar(ctx.service()?, calendar_id).await?,
            )),
            Operation::QuickAdd(request) => {
                Ok(Output::EventId(quick_add(ctx.service()?, request).await?))
            }
            Operation::SearchEvents(request) => Ok(Output::SearchResults(
                search_events(ctx.service()?, request).await?,
            )),
            Operation::MoveEvent(request) => {
                Ok(Output::MovedEvent(move_event(ctx.service()?, request).await?))
            }
            Operation::UpdateAttendees(request) => Ok(Output::EventId(
                update_attendees(ctx.service()?, request).await?,
            )),
        }
    }
}

/// Run operations in order, stopping at the first failure
pub async fn run_all(ctx: &mut Context, operations: &[Operation]) -> CalendarResult<Vec<Output>> {
    let mut outputs = Vec::with_capacity(operations.len());
    for operation in operations {
        outputs.push(operation.execute(ctx).await?);
    }
    Ok(outputs)
}
