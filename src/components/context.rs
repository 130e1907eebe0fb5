use crate::components::google_calendar::CalendarService;
use crate::error::{CalendarResult, Error};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Key under which the authenticated calendar service is published
pub const SERVICE_KEY: &str = "service";

/// Per-run state shared by the units of one workflow.
///
/// The calendar service has its own typed slot; anything else the host wants
/// to pass between units goes into the JSON value map.
#[derive(Default)]
pub struct Context {
    service: Option<CalendarService>,
    values: HashMap<String, Value>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("has_service", &self.service.is_some())
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the calendar service, replacing any previous one
    pub fn set_service(&mut self, service: CalendarService) {
        self.service = Some(service);
    }

    /// The calendar service; an error if no unit has authenticated yet
    pub fn service(&self) -> CalendarResult<&CalendarService> {
        self.service.as_ref().ok_or(Error::MissingService(SERVICE_KEY))
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}
