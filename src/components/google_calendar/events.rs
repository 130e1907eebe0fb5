use super::models::{Attendee, DeletionStatus, Event, EventDateTime, EventList, EventsOutput};
use super::service::CalendarService;
use crate::error::{CalendarResult, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Calendar of the authenticated principal
pub const PRIMARY_CALENDAR: &str = "primary";

fn calendar_or_primary(calendar_id: Option<&str>) -> &str {
    calendar_id
        .filter(|id| !id.is_empty())
        .unwrap_or(PRIMARY_CALENDAR)
}

/// Events overlapping `[start_time, end_time)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetEventsRequest {
    #[serde(default)]
    pub calendar_id: Option<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreateEventRequest {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Partial update: `None` leaves a field as it is, `Some` overwrites it
/// (an empty string or list clears it)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ModifyEventRequest {
    pub event_id: String,
    #[serde(default)]
    pub new_summary: Option<String>,
    #[serde(default)]
    pub new_description: Option<String>,
    #[serde(default)]
    pub new_start_time: Option<String>,
    #[serde(default)]
    pub new_end_time: Option<String>,
    #[serde(default)]
    pub new_location: Option<String>,
    #[serde(default)]
    pub new_participants: Option<Vec<String>>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

impl ModifyEventRequest {
    /// Overlay the supplied fields on `event`
    pub fn apply(&self, event: &mut Event) {
        if let Some(summary) = &self.new_summary {
            event.summary = Some(summary.clone());
        }
        if let Some(description) = &self.new_description {
            event.description = Some(description.clone());
        }
        if let Some(start) = &self.new_start_time {
            event.start = Some(EventDateTime::utc(start));
        }
        if let Some(end) = &self.new_end_time {
            event.end = Some(EventDateTime::utc(end));
        }
        if let Some(location) = &self.new_location {
            event.location = Some(location.clone());
        }
        if let Some(participants) = &self.new_participants {
            event.set_attendees(participants.iter().cloned());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteEventRequest {
    pub event_id: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

/// Natural-language event creation; parsing happens remotely
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuickAddRequest {
    pub query: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchEventsRequest {
    pub query: String,
    pub time_min: String,
    pub time_max: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoveEventRequest {
    pub event_id: String,
    pub source_calendar_id: String,
    pub destination_calendar_id: String,
}

/// Full replacement of an event's attendee list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateAttendeesRequest {
    pub event_id: String,
    pub attendees: Vec<String>,
    #[serde(default)]
    pub calendar_id: Option<String>,
}

impl CreateEventRequest {
    /// Event body with only the supplied optional fields set
    pub fn to_event(&self) -> Event {
        Event {
            summary: Some(self.summary.clone()),
            description: self.description.clone(),
            location: self.location.clone(),
            start: Some(EventDateTime::utc(&self.start_time)),
            end: Some(EventDateTime::utc(&self.end_time)),
            attendees: self
                .participants
                .as_ref()
                .map(|emails| emails.iter().map(Attendee::new).collect()),
            ..Default::default()
        }
    }
}

/// Fetch one event by id
pub async fn get_event(
    service: &CalendarService,
    calendar_id: &str,
    event_id: &str,
) -> CalendarResult<Event> {
    let url = service.url(&["calendars", calendar_id, "events", event_id])?;
    service.get(url, &[]).await
}

/// List events in a window with recurring events expanded, following every page
pub async fn get_events(
    service: &CalendarService,
    request: &GetEventsRequest,
) -> CalendarResult<EventsOutput> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let url = service.url(&["calendars", calendar_id, "events"])?;

    let mut events = Vec::new();
    let mut page_token: Option<String> = None;
    loop {
        let page: EventList = {
            let mut query = vec![
                ("timeMin", request.start_time.as_str()),
                ("timeMax", request.end_time.as_str()),
                ("singleEvents", "true"),
            ];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            service.get(url.clone(), &query).await?
        };
        events.extend(page.items);

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    debug!("Fetched {} events from {}", events.len(), calendar_id);
    Ok(EventsOutput::from_events(&events))
}

/// Create an event and notify its attendees; returns the new id
pub async fn create_event(
    service: &CalendarService,
    request: &CreateEventRequest,
) -> CalendarResult<String> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let url = service.url(&["calendars", calendar_id, "events"])?;

    let created: Event = service
        .post(url, &[("sendUpdates", "all")], Some(&request.to_event()))
        .await?;
    let event_id = created.id.ok_or_else(|| Error::MissingKey("id".to_string()))?;

    info!("Created event {} in {}", event_id, calendar_id);
    Ok(event_id)
}

/// Fetch an event, overlay the supplied fields and write it back
pub async fn modify_event(
    service: &CalendarService,
    request: &ModifyEventRequest,
) -> CalendarResult<String> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let mut event = get_event(service, calendar_id, &request.event_id).await?;
    request.apply(&mut event);

    let url = service.url(&["calendars", calendar_id, "events", &request.event_id])?;
    let updated: Event = service.put(url, &[("sendUpdates", "all")], &event).await?;
    let event_id = updated.id.ok_or_else(|| Error::MissingKey("id".to_string()))?;

    info!("Modified event {} in {}", event_id, calendar_id);
    Ok(event_id)
}

/// Delete an event; remote errors such as not-found are returned as-is
pub async fn delete_event(
    service: &CalendarService,
    request: &DeleteEventRequest,
) -> CalendarResult<DeletionStatus> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let url = service.url(&["calendars", calendar_id, "events", &request.event_id])?;
    service.delete(url).await?;

    info!("Deleted event {} from {}", request.event_id, calendar_id);
    Ok(DeletionStatus::default())
}

/// Create an event from free text; empty string when the response carries no id
pub async fn quick_add(service: &CalendarService, request: &QuickAddRequest) -> CalendarResult<String> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let url = service.url(&["calendars", calendar_id, "events", "quickAdd"])?;

    let created: Event = service
        .post(url, &[("text", request.query.as_str())], None::<&()>)
        .await?;
    let event_id = created.id.unwrap_or_default();

    info!("Quick-added event {} in {}", event_id, calendar_id);
    Ok(event_id)
}

/// Free-text search within a window; the result page is returned unmodified
pub async fn search_events(
    service: &CalendarService,
    request: &SearchEventsRequest,
) -> CalendarResult<EventList> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let url = service.url(&["calendars", calendar_id, "events"])?;
    let query = [
        ("q", request.query.as_str()),
        ("timeMin", request.time_min.as_str()),
        ("timeMax", request.time_max.as_str()),
        ("singleEvents", "true"),
    ];
    service.get(url, &query).await
}

/// Move an event to another calendar
pub async fn move_event(service: &CalendarService, request: &MoveEventRequest) -> CalendarResult<Event> {
    let url = service.url(&[
        "calendars",
        &request.source_calendar_id,
        "events",
        &request.event_id,
        "move",
    ])?;
    let moved: Event = service
        .post(
            url,
            &[("destination", request.destination_calendar_id.as_str())],
            None::<&()>,
        )
        .await?;

    info!(
        "Moved event {} from {} to {}",
        request.event_id, request.source_calendar_id, request.destination_calendar_id
    );
    Ok(moved)
}

/// Replace the whole attendee list of an event
pub async fn update_attendees(
    service: &CalendarService,
    request: &UpdateAttendeesRequest,
) -> CalendarResult<String> {
    let calendar_id = calendar_or_primary(request.calendar_id.as_deref());
    let mut event = get_event(service, calendar_id, &request.event_id).await?;
    event.set_attendees(request.attendees.iter().cloned());

    let url = service.url(&["calendars", calendar_id, "events", &request.event_id])?;
    let updated: Event = service.put(url, &[], &event).await?;

    info!(
        "Set {} attendees on event {}",
        request.attendees.len(),
        request.event_id
    );
    Ok(updated.id.unwrap_or_default())
}
