use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use patient_cell::router::patient_routes;
use shared_database::{AppointmentStore, DoctorStore, MemoryStore, PatientStore};
use shared_models::clinic::{AppointmentStatus, NewAppointment, Patient};
use shared_utils::test_utils::{ClinicFixtures, JwtTestUtils, TestConfig, TestUser};

struct TestApp {
    router: Router,
    config: TestConfig,
    patient: Patient,
}

impl TestApp {
    async fn new() -> Self {
        let config = TestConfig::default();
        let memory = Arc::new(MemoryStore::new());
        let doctor = DoctorStore::insert(
            memory.as_ref(),
            ClinicFixtures::doctor("Dr. Anna Smith", "Cardiology", &["09:00", "10:00"]),
        )
        .await
        .unwrap();
        let patient = PatientStore::insert(memory.as_ref(), ClinicFixtures::patient("Tom Hale"))
            .await
            .unwrap();
        for (hour, status) in [(9, AppointmentStatus::Completed), (10, AppointmentStatus::Scheduled)] {
            AppointmentStore::insert(
                memory.as_ref(),
                NewAppointment {
                    doctor_id: doctor.id,
                    patient_id: patient.id,
                    appointment_time: ClinicFixtures::at(hour, 0),
                    status,
                },
            )
            .await
            .unwrap();
        }

        let router = patient_routes(config.to_state(memory));
        Self { router, config, patient }
    }

    fn patient_token(&self) -> String {
        JwtTestUtils::create_test_token(
            &TestUser::patient(self.patient.id),
            &self.config.jwt_secret,
            None,
        )
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn register(&self, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}

#[tokio::test]
async fn test_register_patient_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app
        .register(json!({
            "name": "Ruth Byrne",
            "email": "ruth@example.com",
            "phone": "555-0111",
            "address": "4 Quay Street"
        }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["patient"]["email"], "ruth@example.com");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = TestApp::new().await;

    let (status, _) = app
        .register(json!({
            "name": "Tom Again",
            "email": app.patient.email,
            "phone": "555-0112",
            "address": "5 Quay Street"
        }))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_requires_every_field() {
    let app = TestApp::new().await;

    let (status, _) = app
        .register(json!({
            "name": "  ",
            "email": "blank@example.com",
            "phone": "555-0113",
            "address": "6 Quay Street"
        }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_own_record() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/me", &app.patient_token()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], app.patient.id);
    assert_eq!(body["name"], "Tom Hale");
}

#[tokio::test]
async fn test_list_appointments() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/appointments", &app.patient_token()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["appointments"][0]["doctor_name"], "Dr. Anna Smith");
    assert_eq!(body["appointments"][0]["patient_address"], "12 Harbour Road");
}

#[tokio::test]
async fn test_filter_appointments_by_condition() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/appointments/filter?condition=FUTURE&doctor_name=smith", &app.patient_token())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["appointments"][0]["status"], 0);
    assert_eq!(body["appointments"][0]["slot"], "10:00");
}

#[tokio::test]
async fn test_filter_appointments_rejects_unknown_condition() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/appointments/filter?condition=someday", &app.patient_token())
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("someday"));
}

#[tokio::test]
async fn test_doctor_token_cannot_read_patient_history() {
    let app = TestApp::new().await;
    let token = JwtTestUtils::create_test_token(&TestUser::doctor(1), &app.config.jwt_secret, None);

    let (status, _) = app.get("/appointments", &token).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_without_role_is_rejected() {
    let app = TestApp::new().await;
    let token = JwtTestUtils::create_token_with_role(
        &app.patient.id.to_string(),
        "nurse",
        &app.config.jwt_secret,
    );

    let (status, _) = app.get("/me", &token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
