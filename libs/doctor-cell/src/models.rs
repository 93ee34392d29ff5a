use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::text::present;

use crate::slots::{parse_slot, slot_hour};

pub use shared_models::clinic::{Doctor, NewDoctor};

// ==============================================================================
// FILTER CRITERIA
// ==============================================================================

/// Coarse half-day bucket derived from a slot's hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimePeriod {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl TimePeriod {
    pub fn contains_hour(self, hour: i32) -> bool {
        match self {
            TimePeriod::Am => (0..12).contains(&hour),
            TimePeriod::Pm => (12..24).contains(&hour),
        }
    }

    /// At least one label has an hour inside this period. Labels without a
    /// readable hour never match, and an empty schedule never matches.
    pub fn matches_any(self, labels: &[String]) -> bool {
        labels
            .iter()
            .any(|label| slot_hour(label).is_some_and(|hour| self.contains_hour(hour)))
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePeriod::Am => write!(f, "AM"),
            TimePeriod::Pm => write!(f, "PM"),
        }
    }
}

impl FromStr for TimePeriod {
    type Err = DoctorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AM" => Ok(TimePeriod::Am),
            "PM" => Ok(TimePeriod::Pm),
            _ => Err(DoctorError::InvalidTimePeriod(s.to_string())),
        }
    }
}

/// Optional directory criteria. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DoctorFilter {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub time_period: Option<TimePeriod>,
}

impl DoctorFilter {
    pub fn parse(
        name: Option<&str>,
        time_period: Option<&str>,
        specialty: Option<&str>,
    ) -> Result<Self, DoctorError> {
        Ok(Self {
            name: present(name).map(str::to_string),
            specialty: present(specialty).map(str::to_string),
            time_period: present(time_period).map(str::parse::<TimePeriod>).transpose()?,
        })
    }
}

// ==============================================================================
// REQUEST / QUERY DTOS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub available_times: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub available_times: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DoctorFilterQuery {
    pub name: Option<String>,
    pub time: Option<String>,
    pub specialty: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

/// Free slots for one doctor on one date, recomputed per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorAvailabilitySnapshot {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub available_slots: Vec<String>,
}

pub fn validate_slot_labels(labels: &[String]) -> Result<(), DoctorError> {
    match labels.iter().find(|label| parse_slot(label).is_none()) {
        Some(bad) => Err(DoctorError::InvalidSlot(bad.clone())),
        None => Ok(()),
    }
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Error)]
pub enum DoctorError {
    #[error("Doctor {0} not found")]
    NotFound(i64),

    #[error("Doctor with email {0} already exists")]
    EmailAlreadyExists(String),

    #[error("Time period must be AM or PM, got '{0}'")]
    InvalidTimePeriod(String),

    #[error("Slot label '{0}' is not a time of day")]
    InvalidSlot(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound(_) => AppError::NotFound(err.to_string()),
            DoctorError::EmailAlreadyExists(_) => AppError::Conflict(err.to_string()),
            DoctorError::InvalidTimePeriod(_)
            | DoctorError::InvalidSlot(_)
            | DoctorError::ValidationError(_) => AppError::ValidationError(err.to_string()),
            DoctorError::Store(db) => db.into(),
        }
    }
}
