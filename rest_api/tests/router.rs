// rest_api/tests/router.rs

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use rest_api::router;
use scheduler::Clinic;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri).header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

struct Setup {
    app: Router,
    patient: String,
    doctor: String,
    room: String,
}

async fn setup() -> Setup {
    let app = router(Clinic::in_memory());
    let (status, patient) = call(
        &app,
        "POST",
        "/api/v1/patients",
        Some(json!({"email": "ana@example.com", "firstName": "Ana", "lastName": "Ruiz"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, doctor) = call(
        &app,
        "POST",
        "/api/v1/doctors",
        Some(json!({"email": "grey@example.com", "firstName": "Meredith", "lastName": "Grey"})),
    )
    .await;
    let (_, room) = call(&app, "POST", "/api/v1/resources", Some(json!({"name": "Room 1", "type": "facility"}))).await;
    Setup {
        app,
        patient: patient["id"].as_str().unwrap().to_string(),
        doctor: doctor["id"].as_str().unwrap().to_string(),
        room: room["id"].as_str().unwrap().to_string(),
    }
}

async fn book(s: &Setup, at: &str) -> (StatusCode, Value) {
    call(
        &s.app,
        "POST",
        "/api/v1/appointments",
        Some(json!({"patientId": s.patient, "doctorId": s.doctor, "appointmentDateTime": at})),
    )
    .await
}

#[tokio::test]
async fn should_report_health() {
    let app = router(Clinic::in_memory());
    let (status, body) = call(&app, "GET", "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn should_map_domain_errors_to_statuses() {
    let s = setup().await;
    let (status, body) = call(&s.app, "GET", &format!("/api/v1/patients/{}", s.doctor), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "not-found");

    let (status, _) = book(&s, "2024-06-03T09:00:00Z").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = book(&s, "2024-06-03T09:00:00Z").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "doctor-unavailable");

    let (status, body) = call(
        &s.app,
        "POST",
        "/api/v1/patients",
        Some(json!({"email": "ANA@example.com", "firstName": "A", "lastName": "R"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "already-exists");
}

#[tokio::test]
async fn should_reject_unknown_decision_action() {
    let s = setup().await;
    let (_, view) = book(&s, "2024-06-03T10:00:00Z").await;
    let id = view["appointment"]["id"].as_str().unwrap();
    let (status, body) = call(
        &s.app,
        "POST",
        &format!("/api/v1/appointments/{}/decision", id),
        Some(json!({"action": "postpone"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");
}

#[tokio::test]
async fn should_accept_with_resources_and_show_doctor_view() {
    let s = setup().await;
    let (_, view) = book(&s, "2024-06-03T11:00:00Z").await;
    let id = view["appointment"]["id"].as_str().unwrap().to_string();
    let (status, decided) = call(
        &s.app,
        "POST",
        &format!("/api/v1/appointments/{}/decision", id),
        Some(json!({"action": "accept", "facilities": [{"id": s.room, "name": "Room 1"}]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decided["appointment"]["status"], "scheduled");
    assert_eq!(decided["resources"]["facilities"][0]["id"], s.room.as_str());

    let (status, free) = call(&s.app, "GET", "/api/v1/resources/available?dateTime=2024-06-03T11:30:00Z", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(free["facilities"], json!([]));

    let (status, again) = call(
        &s.app,
        "POST",
        &format!("/api/v1/appointments/{}/decision", id),
        Some(json!({"action": "reject", "reason": "changed my mind"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again["code"], "invalid-state-transition");

    let (status, doctor_view) =
        call(&s.app, "GET", &format!("/api/v1/doctors/{}/appointments/{}", s.doctor, id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doctor_view["patient"]["id"], s.patient.as_str());
}

#[tokio::test]
async fn should_list_time_slots_and_cancel() {
    let s = setup().await;
    let (_, view) = book(&s, "2024-06-03T08:00:00Z").await;
    let id = view["appointment"]["id"].as_str().unwrap().to_string();

    let (status, slots) =
        call(&s.app, "GET", &format!("/api/v1/doctors/{}/timeslots?date=2024-06-03", s.doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slots.as_array().unwrap().len(), 7);
    assert_eq!(slots[0], json!({"time": "08:00", "status": "unavailable"}));

    let (status, cancelled) = call(
        &s.app,
        "POST",
        &format!("/api/v1/appointments/{}/cancel", id),
        Some(json!({"by": "patient", "reason": "feeling better"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["cancelledBy"], "patient");

    let (status, calendar) = call(
        &s.app,
        "GET",
        &format!("/api/v1/patients/{}/calendar?from=2024-06-01T00:00:00Z", s.patient),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(calendar["appointments"][0]["status"], "cancelled");
}

#[tokio::test]
async fn should_patch_and_delete_prescriptions() {
    let s = setup().await;
    let (status, created) = call(
        &s.app,
        "POST",
        "/api/v1/prescriptions",
        Some(json!({
            "patientId": s.patient,
            "name": "Ibuprofen",
            "start": "2024-06-01T00:00:00Z",
            "end": "2024-06-08T00:00:00Z",
            "doctorsNote": "after meals"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/prescriptions/{}", created["id"].as_str().unwrap());

    let (status, patched) = call(&s.app, "PATCH", &uri, Some(json!({"doctorsNote": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(patched.get("doctorsNote").is_none_or(Value::is_null));

    let (status, _) = call(&s.app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = call(&s.app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
