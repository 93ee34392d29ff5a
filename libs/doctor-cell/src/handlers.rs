use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_utils::extractor::require_role;
use shared_utils::AppState;

use crate::models::{
    AvailabilityQuery, CreateDoctorRequest, DoctorAvailabilitySnapshot, DoctorFilter,
    DoctorFilterQuery, UpdateDoctorRequest,
};
use crate::services::{AvailabilityService, DoctorFilterService, DoctorService};

// ==============================================================================
// PUBLIC HANDLERS (NO AUTHENTICATION REQUIRED)
// ==============================================================================

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let doctors = DoctorService::new(&state.store).list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn filter_doctors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorFilterQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = DoctorFilter::parse(
        query.name.as_deref(),
        query.time.as_deref(),
        query.specialty.as_deref(),
    )?;

    let doctors = DoctorFilterService::new(&state.store)
        .filter_doctors(&filter)
        .await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let doctor = DoctorService::new(&state.store).get_doctor(doctor_id).await?;

    Ok(Json(json!(doctor)))
}

// ==============================================================================
// PROTECTED HANDLERS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let available_slots = AvailabilityService::new(&state.store)
        .compute_availability(doctor_id, query.date)
        .await?;

    Ok(Json(json!(DoctorAvailabilitySnapshot {
        doctor_id,
        date: query.date,
        available_slots,
    })))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    require_role(&user, Role::Admin)?;

    let doctor = DoctorService::new(&state.store).create_doctor(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "doctor": doctor,
            "message": "Doctor created successfully"
        })),
    ))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Extension(user): Extension<User>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    let doctor = DoctorService::new(&state.store)
        .update_doctor(doctor_id, request)
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor": doctor,
        "message": "Doctor updated successfully"
    })))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<i64>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, Role::Admin)?;

    DoctorService::new(&state.store).delete_doctor(doctor_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Doctor deleted successfully"
    })))
}
