use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==============================================================================
// CORE CLINIC ENTITIES
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Configured slot labels ("09:00", "14:30", ...) in the order the clinic set them.
    #[serde(default)]
    pub available_times: Vec<String>,
}

/// Doctor fields needed to create a record; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub specialty: String,
    pub email: String,
    pub phone: Option<String>,
    pub available_times: Vec<String>,
}

impl NewDoctor {
    pub fn with_id(self, id: i64) -> Doctor {
        Doctor {
            id,
            name: self.name,
            specialty: self.specialty,
            email: self.email,
            phone: self.phone,
            available_times: self.available_times,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl NewPatient {
    pub fn with_id(self, id: i64) -> Patient {
        Patient {
            id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }
}

/// Appointment lifecycle flag. Stored and serialized as `0` (scheduled) or `1` (completed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
}

impl AppointmentStatus {
    pub fn code(self) -> i32 {
        match self {
            AppointmentStatus::Scheduled => 0,
            AppointmentStatus::Completed => 1,
        }
    }
}

impl From<AppointmentStatus> for i32 {
    fn from(status: AppointmentStatus) -> Self {
        status.code()
    }
}

impl TryFrom<i32> for AppointmentStatus {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AppointmentStatus::Scheduled),
            1 => Ok(AppointmentStatus::Completed),
            other => Err(format!("Unknown appointment status code: {}", other)),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub doctor_id: i64,
    pub patient_id: i64,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub patient_id: i64,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

impl NewAppointment {
    pub fn with_id(self, id: i64) -> Appointment {
        Appointment {
            id,
            doctor_id: self.doctor_id,
            patient_id: self.patient_id,
            appointment_time: self.appointment_time,
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRef {
    pub id: i64,
    pub name: String,
}

/// An appointment joined with its doctor and patient, as the store returns it
/// for history and day-view queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub id: i64,
    pub appointment_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub doctor: DoctorRef,
    pub patient: Patient,
}

// ==============================================================================
// RESPONSE PROJECTIONS
// ==============================================================================

/// Flattened appointment view handed to callers instead of the joined records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub id: i64,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub patient_address: String,
    pub appointment_time: NaiveDateTime,
    pub appointment_date: NaiveDate,
    pub slot: String,
    pub status: AppointmentStatus,
}

impl From<AppointmentDetails> for AppointmentSummary {
    fn from(details: AppointmentDetails) -> Self {
        Self {
            id: details.id,
            doctor_id: details.doctor.id,
            doctor_name: details.doctor.name,
            patient_id: details.patient.id,
            patient_name: details.patient.name,
            patient_email: details.patient.email,
            patient_phone: details.patient.phone,
            patient_address: details.patient.address,
            appointment_time: details.appointment_time,
            appointment_date: details.appointment_time.date(),
            slot: details.appointment_time.format("%H:%M").to_string(),
            status: details.status,
        }
    }
}
