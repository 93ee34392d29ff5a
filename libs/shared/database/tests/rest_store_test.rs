use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::rest::{RestAppointmentStore, RestDoctorStore, DETAILS_SELECT};
use shared_database::supabase::SupabaseClient;
use shared_database::{AppointmentStore, DbError, DoctorStore};
use shared_models::clinic::{AppointmentStatus, NewAppointment};

fn client_for(server: &MockServer) -> SupabaseClient {
    SupabaseClient::new(&AppConfig {
        supabase_url: server.uri(),
        supabase_service_key: "service-key".to_string(),
        supabase_jwt_secret: String::new(),
        bind_address: "127.0.0.1:0".to_string(),
    })
}

fn doctor_row(id: i64, name: &str, specialty: &str, times: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "specialty": specialty,
        "email": format!("doctor{}@clinic.test", id),
        "phone": null,
        "available_times": times,
    })
}

#[tokio::test]
async fn name_search_uses_case_insensitive_contains() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("name", "ilike.*Smith*"))
        .and(header("apikey", "service-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            doctor_row(1, "Dr. Anna Smith", "Cardiology", &["09:00"])
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = RestDoctorStore::new(client_for(&server));
    let doctors = store.find_by_name_containing("Smith").await.unwrap();

    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].available_times, vec!["09:00".to_string()]);
}

#[tokio::test]
async fn name_and_specialty_search_sends_both_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("name", "ilike.*Lee*"))
        .and(query_param("specialty", "ilike.Dermatology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = RestDoctorStore::new(client_for(&server));
    let doctors = store
        .find_by_name_containing_and_specialty("Lee", "Dermatology")
        .await
        .unwrap();
    assert!(doctors.is_empty());
}

#[tokio::test]
async fn missing_doctor_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = RestDoctorStore::new(client_for(&server));
    assert_eq!(store.find_by_id(99).await.unwrap(), None);
}

#[tokio::test]
async fn day_range_query_brackets_the_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 10,
                "doctor_id": 4,
                "patient_id": 2,
                "appointment_time": "2025-06-02T09:00:00",
                "status": 0
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let store = RestAppointmentStore::new(client_for(&server));
    let rows = store
        .find_by_doctor_and_time_range(
            4,
            date.and_hms_opt(0, 0, 0).unwrap(),
            date.and_hms_nano_opt(23, 59, 59, 999_999_999).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, AppointmentStatus::Scheduled);

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("appointment_time=gte.2025-06-02T00%3A00%3A00"));
    assert!(query.contains("appointment_time=lte.2025-06-02T23%3A59%3A59.999999&"));
}

#[tokio::test]
async fn day_upper_bound_stays_within_microsecond_precision() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", DETAILS_SELECT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let store = RestAppointmentStore::new(client_for(&server));
    store
        .find_details_by_doctor_and_time_range(
            1,
            date.and_hms_opt(0, 0, 0).unwrap(),
            date.and_hms_nano_opt(23, 59, 59, 999_999_999).unwrap(),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let bounds: Vec<String> = requests[0]
        .url
        .query_pairs()
        .filter(|(key, _)| key == "appointment_time")
        .map(|(_, value)| value.into_owned())
        .collect();
    assert_eq!(
        bounds,
        vec![
            "gte.2025-06-02T00:00:00.000000".to_string(),
            "lte.2025-06-02T23:59:59.999999".to_string(),
        ]
    );
}

#[tokio::test]
async fn specialty_wildcards_are_sent_literally() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialty", "ilike.Cardio\\*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("specialty", "ilike.\\%"))
        .and(query_param("name", "ilike.*a\\_b*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = RestDoctorStore::new(client_for(&server));
    assert!(store.find_by_specialty("Cardio*").await.unwrap().is_empty());
    assert!(store
        .find_by_name_containing_and_specialty("a_b", "%")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn history_query_embeds_doctor_and_filters_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", DETAILS_SELECT))
        .and(query_param("patient_id", "eq.2"))
        .and(query_param("status", "eq.1"))
        .and(query_param("doctor.name", "ilike.*house*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "appointment_time": "2025-01-10T14:00:00",
                "status": 1,
                "doctor": { "id": 8, "name": "Dr. Gregory House" },
                "patient": {
                    "id": 2,
                    "name": "Jane Roe",
                    "email": "jane@example.com",
                    "phone": "555-0101",
                    "address": "1 Main St"
                }
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = RestAppointmentStore::new(client_for(&server));
    let rows = store
        .find_by_doctor_name_and_patient_and_status("house", 2, AppointmentStatus::Completed)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].doctor.name, "Dr. Gregory House");
    assert_eq!(rows[0].status, AppointmentStatus::Completed);
}

#[tokio::test]
async fn unique_violation_surfaces_as_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(header("Prefer", "return=representation"))
        .and(body_partial_json(json!({ "doctor_id": 4, "status": 0 })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "code": "23505",
            "message": "duplicate key value violates unique constraint"
        })))
        .mount(&server)
        .await;

    let store = RestAppointmentStore::new(client_for(&server));
    let result = store
        .insert(NewAppointment {
            doctor_id: 4,
            patient_id: 2,
            appointment_time: NaiveDate::from_ymd_opt(2025, 6, 2)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            status: AppointmentStatus::Scheduled,
        })
        .await;

    assert_matches!(result, Err(DbError::Conflict(_)));
}

#[tokio::test]
async fn server_error_is_not_flattened_into_empty_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = RestDoctorStore::new(client_for(&server));
    assert_matches!(store.find_all().await, Err(DbError::Api { status: 500, .. }));
}
