use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use doctor_cell::models::DoctorError;
use shared_database::DbError;
use shared_models::error::AppError;

pub use shared_models::clinic::{Appointment, AppointmentStatus, AppointmentSummary};

// ==============================================================================
// REQUEST / QUERY DTOS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: i64,
    pub appointment_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RescheduleAppointmentRequest {
    pub appointment_time: NaiveDateTime,
}

/// A doctor's view of one working day.
#[derive(Debug, Clone, Deserialize)]
pub struct DoctorDayQuery {
    pub date: NaiveDate,
    pub patient_name: Option<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment {0} not found")]
    NotFound(i64),

    #[error("Doctor {0} not found")]
    DoctorNotFound(i64),

    #[error("Patient {0} not found")]
    PatientNotFound(i64),

    #[error("Appointment {0} belongs to another patient")]
    NotOwner(i64),

    #[error("{time} is not one of doctor {doctor_id}'s appointment slots")]
    NotASlot { doctor_id: i64, time: NaiveDateTime },

    #[error("Doctor {doctor_id} is already booked at {time}")]
    SlotTaken { doctor_id: i64, time: NaiveDateTime },

    #[error(transparent)]
    Availability(#[from] DoctorError),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_)
            | AppointmentError::DoctorNotFound(_)
            | AppointmentError::PatientNotFound(_) => AppError::NotFound(err.to_string()),
            AppointmentError::NotOwner(_) => AppError::Forbidden(err.to_string()),
            AppointmentError::NotASlot { .. } => AppError::ValidationError(err.to_string()),
            AppointmentError::SlotTaken { .. } => AppError::Conflict(err.to_string()),
            AppointmentError::Availability(e) => e.into(),
            AppointmentError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn booking_request_reads_local_timestamp() {
        let request: BookAppointmentRequest = serde_json::from_value(json!({
            "doctor_id": 4,
            "appointment_time": "2030-05-20T09:00:00"
        }))
        .unwrap();
        assert_eq!(request.appointment_time.format("%H:%M").to_string(), "09:00");
    }

    #[test]
    fn errors_map_to_http_classes() {
        let time = NaiveDate::from_ymd_opt(2030, 5, 20)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();

        assert_matches!(AppError::from(AppointmentError::NotFound(1)), AppError::NotFound(_));
        assert_matches!(AppError::from(AppointmentError::NotOwner(1)), AppError::Forbidden(_));
        assert_matches!(
            AppError::from(AppointmentError::NotASlot { doctor_id: 1, time }),
            AppError::ValidationError(_)
        );
        assert_matches!(
            AppError::from(AppointmentError::SlotTaken { doctor_id: 1, time }),
            AppError::Conflict(_)
        );
    }
}
