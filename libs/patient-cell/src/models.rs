use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DbError;
use shared_models::clinic::AppointmentStatus;
use shared_models::error::AppError;

pub use shared_models::clinic::{AppointmentSummary, NewPatient, Patient};

/// Which side of "now" an appointment sits on, as the patient asks for it.
/// Upcoming appointments are still scheduled, past ones are completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentCondition {
    Past,
    Future,
}

impl AppointmentCondition {
    pub fn status(self) -> AppointmentStatus {
        match self {
            AppointmentCondition::Past => AppointmentStatus::Completed,
            AppointmentCondition::Future => AppointmentStatus::Scheduled,
        }
    }
}

impl fmt::Display for AppointmentCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentCondition::Past => write!(f, "past"),
            AppointmentCondition::Future => write!(f, "future"),
        }
    }
}

impl FromStr for AppointmentCondition {
    type Err = PatientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "past" => Ok(AppointmentCondition::Past),
            "future" => Ok(AppointmentCondition::Future),
            _ => Err(PatientError::InvalidCondition(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPatientRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentFilterQuery {
    pub condition: Option<String>,
    pub doctor_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(i64),

    #[error("Patient with email {0} already exists")]
    EmailAlreadyExists(String),

    #[error("Condition must be 'past' or 'future', got '{0}'")]
    InvalidCondition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<PatientError> for AppError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => AppError::NotFound(err.to_string()),
            PatientError::EmailAlreadyExists(_) => AppError::Conflict(err.to_string()),
            PatientError::InvalidCondition(_) | PatientError::ValidationError(_) => {
                AppError::ValidationError(err.to_string())
            }
            PatientError::Store(db) => db.into(),
        }
    }
}
