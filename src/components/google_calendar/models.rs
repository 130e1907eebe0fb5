use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Start or end of an event: either a precise instant or a whole-day date
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    /// An instant interpreted in UTC
    pub fn utc(date_time: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: Some("UTC".to_string()),
        }
    }

    /// The instant if present, otherwise the whole-day date
    pub fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Event attendee; fields other than the email are carried through untouched
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Attendee {
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

/// Calendar event resource.
///
/// Remote fields without a typed counterpart land in `extra` so that a
/// fetch-then-update round trip sends them back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hangout_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Attendee emails in the order the API returned them
    pub fn attendee_emails(&self) -> Vec<String> {
        self.attendees
            .iter()
            .flatten()
            .map(|a| a.email.clone())
            .collect()
    }

    /// Replace the attendee list with plain email entries
    pub fn set_attendees<I, S>(&mut self, emails: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attendees = Some(emails.into_iter().map(Attendee::new).collect());
    }
}

/// One page of `events.list`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<Event>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of the authenticated principal's calendar list
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Calendar metadata from `calendars.get`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Flattened view of an event as produced by `get_events`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventSummary {
    pub event_name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub location: String,
    pub participants: Vec<String>,
    pub gmeet_link: String,
    pub meeting_id: Option<String>,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        let gmeet_link = event.hangout_link.clone().unwrap_or_default();
        Self {
            event_name: event
                .summary
                .clone()
                .unwrap_or_else(|| "No Title".to_string()),
            start_time: event
                .start
                .as_ref()
                .and_then(|s| s.value())
                .map(str::to_string),
            end_time: event
                .end
                .as_ref()
                .and_then(|e| e.value())
                .map(str::to_string),
            location: event.location.clone().unwrap_or_default(),
            participants: event.attendee_emails(),
            meeting_id: extract_meeting_id(&gmeet_link),
            gmeet_link,
        }
    }
}

/// Result of `get_events`: a notice when the window is empty, otherwise the summaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EventsOutput {
    Events { events: Vec<EventSummary> },
    NoEvents { message: String },
}

impl EventsOutput {
    pub const NO_EVENTS_MESSAGE: &'static str = "No events found for the specified time range.";

    pub fn from_events(events: &[Event]) -> Self {
        if events.is_empty() {
            EventsOutput::NoEvents {
                message: Self::NO_EVENTS_MESSAGE.to_string(),
            }
        } else {
            EventsOutput::Events {
                events: events.iter().map(EventSummary::from).collect(),
            }
        }
    }

    /// The summaries, empty for the no-events notice
    pub fn events(&self) -> &[EventSummary] {
        match self {
            EventsOutput::Events { events } => events,
            EventsOutput::NoEvents { .. } => &[],
        }
    }
}

/// Status returned by `delete_event`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeletionStatus {
    pub status: String,
}

impl Default for DeletionStatus {
    fn default() -> Self {
        Self {
            status: "Event deleted successfully.".to_string(),
        }
    }
}

/// Meeting code from a conferencing URL: its last path segment
pub fn extract_meeting_id(meet_url: &str) -> Option<String> {
    if meet_url.is_empty() {
        return None;
    }
    meet_url.rsplit('/').next().map(str::to_string)
}
