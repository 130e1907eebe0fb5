mod common;

use common::{
    body_json, content_length, context_for, query_value, requests_to, service_for, TEST_TOKEN,
};
use gcal_units::components::google_calendar::{
    create_event, delete_event, get_event, get_events, modify_event, move_event, quick_add,
    run_all, search_events, update_attendees, CreateEventRequest, DeleteEventRequest,
    EventsOutput, GetEventsRequest, ModifyEventRequest, MoveEventRequest, QuickAddRequest,
    SearchEventsRequest, UpdateAttendeesRequest,
};
use gcal_units::components::{Operation, Output};
use gcal_units::error::Error;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn existing_event() -> serde_json::Value {
    json!({
        "id": "evt1",
        "summary": "Planning",
        "description": "Quarterly planning",
        "location": "Room 1",
        "start": {"dateTime": "2025-01-01T10:00:00Z", "timeZone": "UTC"},
        "end": {"dateTime": "2025-01-01T11:00:00Z", "timeZone": "UTC"},
        "attendees": [
            {"email": "old@x.com", "responseStatus": "accepted"},
            {"email": "gone@x.com", "responseStatus": "needsAction"}
        ],
        "reminders": {"useDefault": true},
        "etag": "\"3181161784712000\""
    })
}

#[tokio::test]
async fn create_then_get_returns_the_event() {
    let server = MockServer::start().await;
    let created = json!({
        "id": "new-event",
        "summary": "S",
        "start": {"dateTime": "2025-01-01T10:00:00Z", "timeZone": "UTC"},
        "end": {"dateTime": "2025-01-01T11:00:00Z", "timeZone": "UTC"}
    });

    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .and(query_param("sendUpdates", "all"))
        .and(header("Authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(&created))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("timeMin", "2025-01-01T10:00:00Z"))
        .and(query_param("timeMax", "2025-01-01T11:00:00Z"))
        .and(query_param("singleEvents", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [created]})))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let event_id = create_event(
        &service,
        &CreateEventRequest {
            summary: "S".to_string(),
            start_time: "2025-01-01T10:00:00Z".to_string(),
            end_time: "2025-01-01T11:00:00Z".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(event_id, "new-event");

    let output = get_events(
        &service,
        &GetEventsRequest {
            calendar_id: None,
            start_time: "2025-01-01T10:00:00Z".to_string(),
            end_time: "2025-01-01T11:00:00Z".to_string(),
        },
    )
    .await
    .unwrap();

    let events = output.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event_name, "S");
    assert_eq!(events[0].start_time.as_deref(), Some("2025-01-01T10:00:00Z"));

    // Unsupplied optional fields never reach the wire
    let posted = requests_to(&server, "POST", "/calendars/primary/events").await;
    let body = body_json(&posted[0]);
    assert!(body.get("description").is_none());
    assert!(body.get("location").is_none());
    assert!(body.get("attendees").is_none());
    assert_eq!(body["start"], json!({"dateTime": "2025-01-01T10:00:00Z", "timeZone": "UTC"}));
}

#[tokio::test]
async fn create_sends_supplied_participants() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/team/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "e2"})))
        .mount(&server)
        .await;

    create_event(
        &service_for(&server),
        &CreateEventRequest {
            summary: "Sync".to_string(),
            start_time: "2025-02-01T09:00:00Z".to_string(),
            end_time: "2025-02-01T09:30:00Z".to_string(),
            description: Some("Weekly".to_string()),
            participants: Some(vec!["a@x.com".to_string(), "b@x.com".to_string()]),
            calendar_id: Some("team".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let posted = requests_to(&server, "POST", "/calendars/team/events").await;
    let body = body_json(&posted[0]);
    assert_eq!(body["description"], "Weekly");
    assert_eq!(body["attendees"], json!([{"email": "a@x.com"}, {"email": "b@x.com"}]));
}

#[tokio::test]
async fn get_events_reports_empty_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let output = get_events(
        &service_for(&server),
        &GetEventsRequest {
            calendar_id: Some("primary".to_string()),
            start_time: "2025-01-01T00:00:00Z".to_string(),
            end_time: "2025-01-02T00:00:00Z".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(
        output,
        EventsOutput::NoEvents {
            message: "No events found for the specified time range.".to_string()
        }
    );
}

#[tokio::test]
async fn get_events_follows_pages_and_extracts_meeting_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "b",
                "summary": "All hands",
                "start": {"date": "2025-01-03"},
                "end": {"date": "2025-01-04"}
            }]
        })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "a",
                "summary": "Standup",
                "start": {"dateTime": "2025-01-02T09:00:00Z"},
                "end": {"dateTime": "2025-01-02T09:15:00Z"},
                "attendees": [{"email": "a@x.com"}],
                "hangoutLink": "https://meet.google.com/abc-defg-hij"
            }],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let output = get_events(
        &service_for(&server),
        &GetEventsRequest {
            calendar_id: None,
            start_time: "2025-01-01T00:00:00Z".to_string(),
            end_time: "2025-01-07T00:00:00Z".to_string(),
        },
    )
    .await
    .unwrap();

    let events = output.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event_name, "Standup");
    assert_eq!(events[0].meeting_id.as_deref(), Some("abc-defg-hij"));
    assert_eq!(events[0].participants, vec!["a@x.com"]);
    assert_eq!(events[1].event_name, "All hands");
    assert_eq!(events[1].start_time.as_deref(), Some("2025-01-03"));
    assert_eq!(events[1].meeting_id, None);
    assert_eq!(events[1].gmeet_link, "");
}

#[tokio::test]
async fn create_without_id_in_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = create_event(
        &service_for(&server),
        &CreateEventRequest {
            summary: "S".to_string(),
            start_time: "2025-01-01T10:00:00Z".to_string(),
            end_time: "2025-01-01T11:00:00Z".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MissingKey(ref key) if key == "id"));
}

#[tokio::test]
async fn modify_without_id_in_response_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(existing_event()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = modify_event(
        &service_for(&server),
        &ModifyEventRequest {
            event_id: "evt1".to_string(),
            new_summary: Some("Renamed".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::MissingKey(ref key) if key == "id"));
}

#[tokio::test]
async fn modify_only_location_leaves_everything_else() {
    let server = MockServer::start().await;
    let original = existing_event();
    let mut expected = original.clone();
    expected["location"] = json!("Room 2");

    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&original))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .and(query_param("sendUpdates", "all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&expected))
        .expect(1)
        .mount(&server)
        .await;

    let event_id = modify_event(
        &service_for(&server),
        &ModifyEventRequest {
            event_id: "evt1".to_string(),
            new_location: Some("Room 2".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(event_id, "evt1");

    let put = requests_to(&server, "PUT", "/calendars/primary/events/evt1").await;
    assert_eq!(body_json(&put[0]), expected);
}

#[tokio::test]
async fn modify_without_changes_round_trips_the_record() {
    let server = MockServer::start().await;
    let original = existing_event();

    Mock::given(method("GET"))
        .and(path("/calendars/work/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&original))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/work/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&original))
        .expect(1)
        .mount(&server)
        .await;

    modify_event(
        &service_for(&server),
        &ModifyEventRequest {
            event_id: "evt1".to_string(),
            calendar_id: Some("work".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let put = requests_to(&server, "PUT", "/calendars/work/events/evt1").await;
    assert_eq!(body_json(&put[0]), original);
}

#[tokio::test]
async fn modify_times_are_sent_as_utc_instants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(existing_event()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt1"})))
        .mount(&server)
        .await;

    modify_event(
        &service_for(&server),
        &ModifyEventRequest {
            event_id: "evt1".to_string(),
            new_start_time: Some("2025-01-01T12:00:00Z".to_string()),
            new_end_time: Some("2025-01-01T13:00:00Z".to_string()),
            new_participants: Some(vec!["new@x.com".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let put = requests_to(&server, "PUT", "/calendars/primary/events/evt1").await;
    let body = body_json(&put[0]);
    assert_eq!(body["start"], json!({"dateTime": "2025-01-01T12:00:00Z", "timeZone": "UTC"}));
    assert_eq!(body["end"], json!({"dateTime": "2025-01-01T13:00:00Z", "timeZone": "UTC"}));
    assert_eq!(body["attendees"], json!([{"email": "new@x.com"}]));
    assert_eq!(body["summary"], "Planning");
}

#[tokio::test]
async fn update_attendees_replaces_the_whole_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(existing_event()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt1"})))
        .mount(&server)
        .await;

    let event_id = update_attendees(
        &service_for(&server),
        &UpdateAttendeesRequest {
            event_id: "evt1".to_string(),
            attendees: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            calendar_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(event_id, "evt1");

    let put = requests_to(&server, "PUT", "/calendars/primary/events/evt1").await;
    let body = body_json(&put[0]);
    assert_eq!(body["attendees"], json!([{"email": "a@x.com"}, {"email": "b@x.com"}]));
    assert_eq!(body["location"], "Room 1");
    assert_eq!(query_value(&put[0], "sendUpdates"), None);
}

#[tokio::test]
async fn update_attendees_without_id_in_response_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(existing_event()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let event_id = update_attendees(
        &service_for(&server),
        &UpdateAttendeesRequest {
            event_id: "evt1".to_string(),
            attendees: vec![],
            calendar_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(event_id, "");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events/evt1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Not Found"}
        })))
        .mount(&server)
        .await;

    let service = service_for(&server);
    let status = delete_event(
        &service,
        &DeleteEventRequest {
            event_id: "evt1".to_string(),
            calendar_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(status.status, "Event deleted successfully.");

    let err = get_event(&service, "primary", "evt1").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn delete_propagates_permission_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/shared/events/evt1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = delete_event(
        &service_for(&server),
        &DeleteEventRequest {
            event_id: "evt1".to_string(),
            calendar_id: Some("shared".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), Some(403));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn quick_add_passes_text_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events/quickAdd"))
        .and(query_param("text", "Lunch with John tomorrow at noon"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "qa1"})))
        .expect(1)
        .mount(&server)
        .await;

    let event_id = quick_add(
        &service_for(&server),
        &QuickAddRequest {
            query: "Lunch with John tomorrow at noon".to_string(),
            calendar_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(event_id, "qa1");

    let posted = requests_to(&server, "POST", "/calendars/primary/events/quickAdd").await;
    assert_eq!(content_length(&posted[0]).as_deref(), Some("0"));
    assert!(posted[0].body.is_empty());
}

#[tokio::test]
async fn quick_add_without_id_returns_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events/quickAdd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"kind": "calendar#event"})))
        .mount(&server)
        .await;

    let event_id = quick_add(
        &service_for(&server),
        &QuickAddRequest {
            query: "Gym".to_string(),
            calendar_id: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(event_id, "");
}

#[tokio::test]
async fn search_returns_the_result_page_unmodified() {
    let server = MockServer::start().await;
    let page = json!({
        "kind": "calendar#events",
        "summary": "Team",
        "timeZone": "Europe/Helsinki",
        "items": [{"id": "s1", "summary": "Retro", "status": "confirmed"}]
    });
    Mock::given(method("GET"))
        .and(path("/calendars/team/events"))
        .and(query_param("q", "Retro"))
        .and(query_param("timeMin", "2025-01-01T00:00:00Z"))
        .and(query_param("timeMax", "2025-02-01T00:00:00Z"))
        .and(query_param("singleEvents", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page))
        .mount(&server)
        .await;

    let result = search_events(
        &service_for(&server),
        &SearchEventsRequest {
            query: "Retro".to_string(),
            time_min: "2025-01-01T00:00:00Z".to_string(),
            time_max: "2025-02-01T00:00:00Z".to_string(),
            calendar_id: Some("team".to_string()),
        },
    )
    .await
    .unwrap();

    assert_eq!(serde_json::to_value(&result).unwrap(), page);
}

#[tokio::test]
async fn move_event_returns_moved_representation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/source/events/evt1/move"))
        .and(query_param("destination", "dest@group.calendar.google.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt1",
            "summary": "Planning",
            "organizer": {"email": "dest@group.calendar.google.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let moved = move_event(
        &service_for(&server),
        &MoveEventRequest {
            event_id: "evt1".to_string(),
            source_calendar_id: "source".to_string(),
            destination_calendar_id: "dest@group.calendar.google.com".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(moved.id.as_deref(), Some("evt1"));
    assert_eq!(moved.extra["organizer"]["email"], "dest@group.calendar.google.com");

    let posted = requests_to(&server, "POST", "/calendars/source/events/evt1/move").await;
    assert_eq!(content_length(&posted[0]).as_deref(), Some("0"));
}

#[tokio::test]
async fn operations_share_the_context_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "wf1"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/wf1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut ctx = context_for(&server);
    let operations: Vec<Operation> = serde_json::from_value(json!([
        {"op": "extract_event", "json": "{\"summary\":\"Lunch\",\"start_time\":\"T1\",\"end_time\":\"T2\"}"},
        {"op": "create_event", "summary": "Lunch", "start_time": "T1", "end_time": "T2"},
        {"op": "delete_event", "event_id": "wf1"}
    ]))
    .unwrap();

    let outputs = run_all(&mut ctx, &operations).await.unwrap();

    assert_eq!(outputs.len(), 3);
    assert!(matches!(&outputs[0], Output::Extracted(e) if e.location.is_empty()));
    assert_eq!(outputs[1], Output::EventId("wf1".to_string()));
    assert!(matches!(&outputs[2], Output::Deletion(_)));
}
