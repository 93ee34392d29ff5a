use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{info, warn};

use shared_config::AppConfig;
use shared_models::clinic::{
    Appointment, AppointmentDetails, AppointmentStatus, Doctor, NewAppointment, NewDoctor,
    NewPatient, Patient,
};

use crate::error::DbError;
use crate::memory::MemoryStore;
use crate::rest::{RestAppointmentStore, RestDoctorStore, RestPatientStore};
use crate::supabase::SupabaseClient;

/// Doctor directory queries. Name matching is a case-insensitive substring match,
/// specialty matching is case-insensitive equality.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Doctor>, DbError>;
    async fn find_all(&self) -> Result<Vec<Doctor>, DbError>;
    async fn find_by_name_containing(&self, name: &str) -> Result<Vec<Doctor>, DbError>;
    async fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, DbError>;
    async fn find_by_name_containing_and_specialty(
        &self,
        name: &str,
        specialty: &str,
    ) -> Result<Vec<Doctor>, DbError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DbError>;
    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DbError>;
    /// Replaces the stored record; `None` when no doctor has that id.
    async fn update(&self, doctor: Doctor) -> Result<Option<Doctor>, DbError>;
    async fn delete(&self, id: i64) -> Result<bool, DbError>;
}

/// Appointment queries. `insert` and `update` are conditional writes: they fail with
/// [`DbError::Conflict`] when the doctor already holds another appointment at the
/// identical timestamp.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, DbError>;
    /// Both bounds inclusive.
    async fn find_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, DbError>;
    async fn find_details_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AppointmentDetails>, DbError>;
    async fn find_by_patient(&self, patient_id: i64) -> Result<Vec<AppointmentDetails>, DbError>;
    async fn find_by_doctor_name_and_patient(
        &self,
        doctor_name: &str,
        patient_id: i64,
    ) -> Result<Vec<AppointmentDetails>, DbError>;
    async fn find_by_doctor_name_and_patient_and_status(
        &self,
        doctor_name: &str,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>, DbError>;
    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError>;
    async fn update(&self, appointment: Appointment) -> Result<Option<Appointment>, DbError>;
    async fn delete(&self, id: i64) -> Result<bool, DbError>;
    async fn delete_by_doctor(&self, doctor_id: i64) -> Result<usize, DbError>;
}

#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, DbError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DbError>;
    async fn insert(&self, patient: NewPatient) -> Result<Patient, DbError>;
}

/// Handles to every store the cells need, cheap to clone into request handlers.
#[derive(Clone)]
pub struct ClinicStore {
    pub doctors: Arc<dyn DoctorStore>,
    pub patients: Arc<dyn PatientStore>,
    pub appointments: Arc<dyn AppointmentStore>,
}

impl ClinicStore {
    pub fn supabase(config: &AppConfig) -> Self {
        let client = SupabaseClient::new(config);
        Self {
            doctors: Arc::new(RestDoctorStore::new(client.clone())),
            patients: Arc::new(RestPatientStore::new(client.clone())),
            appointments: Arc::new(RestAppointmentStore::new(client)),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    pub fn from_memory(memory: Arc<MemoryStore>) -> Self {
        Self {
            doctors: memory.clone(),
            patients: memory.clone(),
            appointments: memory,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        if config.is_configured() {
            info!("Using Supabase store at {}", config.supabase_url);
            Self::supabase(config)
        } else {
            warn!("Supabase not configured, falling back to in-memory store");
            Self::in_memory()
        }
    }
}
