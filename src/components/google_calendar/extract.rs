use crate::error::{CalendarResult, Error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event fields pulled out of a JSON payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedEvent {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub participants: Vec<String>,
}

fn required_str(data: &Map<String, Value>, key: &str) -> CalendarResult<String> {
    let value = data.get(key).ok_or_else(|| Error::MissingKey(key.to_string()))?;
    as_string(value, key)
}

fn as_string(value: &Value, key: &str) -> CalendarResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::Serialization(format!(
            "Expected \"{}\" to be a string, found {}",
            key, other
        ))),
    }
}

/// Parse `{"summary", "start_time", "end_time", "location"?, "participants"?}`;
/// `null` optional fields count as absent
pub fn extract_event(json: &str) -> CalendarResult<ExtractedEvent> {
    let data: Map<String, Value> = serde_json::from_str(json)?;

    let summary = required_str(&data, "summary")?;
    let start_time = required_str(&data, "start_time")?;
    let end_time = required_str(&data, "end_time")?;

    let location = match data.get("location") {
        Some(Value::Null) | None => String::new(),
        Some(value) => as_string(value, "location")?,
    };

    let participants = match data.get("participants") {
        Some(Value::Null) | None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| as_string(item, "participants"))
            .collect::<CalendarResult<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::Serialization(format!(
                "Expected \"participants\" to be a list, found {}",
                other
            )))
        }
    };

    Ok(ExtractedEvent {
        summary,
        start_time,
        end_time,
        location,
        participants,
    })
}
