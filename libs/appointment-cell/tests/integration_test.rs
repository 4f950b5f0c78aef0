use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::router::appointment_routes;
use appointment_cell::services::{InMemorySlotRepository, SlotRepository};
use appointment_cell::AppointmentState;
use profile_cell::{InMemoryProfileStore, ProfileStore};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

struct TestApp {
    app: Router,
    profiles: Arc<InMemoryProfileStore>,
    secret: String,
}

impl TestApp {
    fn new() -> Self {
        let config = TestConfig::default();
        let profiles = Arc::new(InMemoryProfileStore::new());
        let slots: Arc<dyn SlotRepository> =
            Arc::new(InMemorySlotRepository::new(profiles.clone() as Arc<dyn ProfileStore>));
        let state = AppointmentState::new(config.to_arc(), slots, profiles.clone() as Arc<dyn ProfileStore>);

        Self {
            app: appointment_routes(state),
            profiles,
            secret: config.jwt_secret,
        }
    }

    fn token(&self, user: &TestUser) -> String {
        JwtTestUtils::create_test_token(user, &self.secret, Some(1))
    }

    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.send("GET", "/available", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let forged = JwtTestUtils::create_invalid_signature_token(&TestUser::patient("p@example.com"));
    let (status, _) = app.send("GET", "/available", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_list_and_book_flow() {
    let app = TestApp::new();
    let doctor = TestUser::doctor("doctor@example.com");
    let doctor_profile = app.profiles.add_doctor(&doctor.id, "Dr. Rao", None).await;
    let priya = TestUser::patient("priya@example.com");
    let priya_profile = app.profiles.add_patient(&priya.id, "Priya", None).await;
    let quasim = TestUser::patient("quasim@example.com");
    app.profiles.add_patient(&quasim.id, "Quasim", None).await;

    // Doctor opens a slot
    let (status, created) = app
        .send("POST", "/", Some(&app.token(&doctor)), Some(json!({ "scheduled_at": "2025-03-01T10:00:00Z" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["doctor_id"], json!(doctor_profile.id));
    let slot_id = created["id"].as_str().unwrap().to_string();

    let (status, available) = app.send("GET", "/available", Some(&app.token(&priya)), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = available.as_array().unwrap().iter().find(|s| s["id"] == json!(slot_id)).unwrap();
    assert_eq!(listed["status"], "available");
    assert!(listed["patient_id"].is_null());

    // First booking wins
    let (status, booked) = app
        .send("POST", &format!("/{}/book", slot_id), Some(&app.token(&priya)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booked["status"], "booked");
    assert_eq!(booked["patient_id"], json!(priya_profile.id));

    let (status, body) = app
        .send("POST", &format!("/{}/book", slot_id), Some(&app.token(&quasim)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Appointment slot is already booked");

    let (_, fetched) = app.send("GET", &format!("/{}", slot_id), Some(&app.token(&quasim)), None).await;
    assert_eq!(fetched["patient_id"], json!(priya_profile.id));

    let (_, available) = app.send("GET", "/available", Some(&app.token(&priya)), None).await;
    assert!(available.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_asha_worker_create_without_doctor_is_bad_request() {
    let app = TestApp::new();
    let asha = TestUser::asha_worker("asha@example.com");
    app.profiles.add_asha_worker(&asha.id, "Sunita", None).await;

    let (status, body) = app
        .send("POST", "/", Some(&app.token(&asha)), Some(json!({ "scheduled_at": "2025-03-01T10:00:00Z" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("doctor_id"));

    let (status, _) = app
        .send("POST", "/", Some(&app.token(&asha)), Some(json!({
            "scheduled_at": "2025-03-01T10:00:00Z",
            "doctor_id": Uuid::new_v4()
        })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_create_body_is_validation_error() {
    let app = TestApp::new();
    let asha = TestUser::asha_worker("asha@example.com");
    app.profiles.add_asha_worker(&asha.id, "Sunita", None).await;

    let (status, body) = app.send("POST", "/", Some(&app.token(&asha)), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("scheduled_at"));

    let (status, body) = app
        .send("POST", "/", Some(&app.token(&asha)), Some(json!({ "scheduled_at": "not-a-date" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_asha_worker_books_via_slot_route() {
    let app = TestApp::new();
    let doctor = TestUser::doctor("doctor@example.com");
    let doctor_profile = app.profiles.add_doctor(&doctor.id, "Dr. Rao", None).await;
    let asha = TestUser::asha_worker("asha@example.com");
    let asha_profile = app.profiles.add_asha_worker(&asha.id, "Sunita", None).await;
    let patient = app.profiles.add_patient("village-patient", "Meera", Some(asha_profile.id)).await;

    let (status, created) = app
        .send("POST", "/", Some(&app.token(&asha)), Some(json!({
            "scheduled_at": "2025-03-01T10:00:00Z",
            "doctor_id": doctor_profile.id
        })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let slot_id = created["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send("POST", &format!("/{}/book", slot_id), Some(&app.token(&asha)), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, booked) = app
        .send("POST", &format!("/{}/book", slot_id), Some(&app.token(&asha)), Some(json!({ "patient_id": patient.id })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booked["patient_id"], json!(patient.id));

    let (status, schedule) = app.send("GET", "/patient/me", Some(&app.token(&asha)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_role_gated_routes() {
    let app = TestApp::new();
    let doctor = TestUser::doctor("doctor@example.com");
    app.profiles.add_doctor(&doctor.id, "Dr. Rao", None).await;
    let patient = TestUser::patient("priya@example.com");
    app.profiles.add_patient(&patient.id, "Priya", None).await;
    let pharmacist = TestUser::pharmacist("pharm@example.com");
    app.profiles.add_pharmacist(&pharmacist.id, "Anil", Some("City Pharmacy")).await;

    let (status, _) = app.send("GET", "/doctor/me", Some(&app.token(&patient)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("GET", "/patient/me", Some(&app.token(&doctor)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send("POST", "/", Some(&app.token(&pharmacist)), Some(json!({ "scheduled_at": "2025-03-01T10:00:00Z" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, schedule) = app.send("GET", "/doctor/me", Some(&app.token(&doctor)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(schedule.as_array().unwrap().is_empty());

    let (status, _) = app.send("GET", "/available", Some(&app.token(&pharmacist)), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_identifiers_are_not_found() {
    let app = TestApp::new();
    let patient = TestUser::patient("priya@example.com");
    app.profiles.add_patient(&patient.id, "Priya", None).await;
    let token = app.token(&patient);

    let (status, _) = app.send("POST", &format!("/{}/book", Uuid::new_v4()), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send("GET", &format!("/{}", Uuid::new_v4()), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("GET", &format!("/doctor/{}/available", Uuid::new_v4()), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send("GET", &format!("/available?doctor_id={}", Uuid::new_v4()), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_without_profile_is_not_found() {
    let app = TestApp::new();
    let orphan = TestUser::doctor("orphan@example.com");

    let (status, _) = app
        .send("POST", "/", Some(&app.token(&orphan)), Some(json!({ "scheduled_at": "2025-03-01T10:00:00Z" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
