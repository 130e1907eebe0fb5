use super::models::{Calendar, CalendarList};
use super::service::CalendarService;
use crate::error::CalendarResult;
use tracing::debug;

/// Calendars visible to the authenticated principal
pub async fn list_calendars(service: &CalendarService) -> CalendarResult<CalendarList> {
    let url = service.url(&["users", "me", "calendarList"])?;
    let calendars: CalendarList = service.get(url, &[]).await?;
    debug!("Listed {} calendars", calendars.items.len());
    Ok(calendars)
}

/// Metadata of one calendar
pub async fn get_calendar(service: &CalendarService, calendar_id: &str) -> CalendarResult<Calendar> {
    let url = service.url(&["calendars", calendar_id])?;
    service.get(url, &[]).await
}
