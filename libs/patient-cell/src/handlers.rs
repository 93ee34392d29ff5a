use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::{caller_record_id, require_role};
use shared_utils::AppState;

use crate::models::{AppointmentFilterQuery, RegisterPatientRequest};
use crate::services::{AppointmentHistoryService, PatientService};

fn calling_patient(user: &User) -> Result<i64, AppError> {
    require_role(user, Role::Patient)?;
    caller_record_id(user)
}

#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let patient = PatientService::new(&state.store)
        .register_patient(request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "patient": patient,
            "message": "Patient registered successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_current_patient(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = calling_patient(&user)?;

    let patient = PatientService::new(&state.store).get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let patient_id = calling_patient(&user)?;

    let appointments = AppointmentHistoryService::new(&state.store)
        .get_patient_appointments(patient_id)
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn filter_patient_appointments(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentFilterQuery>,
) -> Result<Json<Value>, AppError> {
    let patient_id = calling_patient(&user)?;

    let appointments = AppointmentHistoryService::new(&state.store)
        .filter_patient_appointments(
            patient_id,
            query.condition.as_deref(),
            query.doctor_name.as_deref(),
        )
        .await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
