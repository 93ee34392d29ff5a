use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use doctor_cell::slots::day_bounds;
use shared_database::{AppointmentStore, ClinicStore};

use crate::models::{AppointmentError, AppointmentSummary};

pub struct DoctorScheduleService {
    appointments: Arc<dyn AppointmentStore>,
}

impl DoctorScheduleService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            appointments: store.appointments.clone(),
        }
    }

    /// A doctor's appointments on `date`, earliest first. `patient_name` narrows by
    /// case-insensitive substring; blank means no narrowing.
    pub async fn doctor_day_appointments(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        patient_name: Option<&str>,
    ) -> Result<Vec<AppointmentSummary>, AppointmentError> {
        let (start, end) = day_bounds(date);
        let mut rows = self
            .appointments
            .find_details_by_doctor_and_time_range(doctor_id, start, end)
            .await?;

        if let Some(needle) = patient_name.map(str::trim).filter(|n| !n.is_empty()) {
            let needle = needle.to_lowercase();
            rows.retain(|row| row.patient.name.to_lowercase().contains(&needle));
        }
        rows.sort_by_key(|row| row.appointment_time);

        debug!("Doctor {} has {} appointments on {}", doctor_id, rows.len(), date);
        Ok(rows.into_iter().map(AppointmentSummary::from).collect())
    }
}
