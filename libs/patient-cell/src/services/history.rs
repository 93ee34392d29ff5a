use std::sync::Arc;

use tracing::debug;

use shared_database::{AppointmentStore, ClinicStore};
use shared_utils::text::present;

use crate::models::{AppointmentCondition, AppointmentSummary, PatientError};

pub struct AppointmentHistoryService {
    appointments: Arc<dyn AppointmentStore>,
}

impl AppointmentHistoryService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            appointments: store.appointments.clone(),
        }
    }

    pub async fn get_patient_appointments(
        &self,
        patient_id: i64,
    ) -> Result<Vec<AppointmentSummary>, PatientError> {
        let rows = self.appointments.find_by_patient(patient_id).await?;
        Ok(rows.into_iter().map(AppointmentSummary::from).collect())
    }

    /// Patient history narrowed by condition and doctor name. Blank inputs mean
    /// "no constraint"; a condition other than past/future is rejected.
    pub async fn filter_patient_appointments(
        &self,
        patient_id: i64,
        condition: Option<&str>,
        doctor_name: Option<&str>,
    ) -> Result<Vec<AppointmentSummary>, PatientError> {
        let condition = present(condition)
            .map(str::parse::<AppointmentCondition>)
            .transpose()?;
        let doctor_name = present(doctor_name);

        debug!(
            "Filtering appointments of patient {} (condition: {:?}, doctor: {:?})",
            patient_id, condition, doctor_name
        );

        let rows = match (condition, doctor_name) {
            (Some(condition), Some(name)) => {
                self.appointments
                    .find_by_doctor_name_and_patient_and_status(name, patient_id, condition.status())
                    .await?
            }
            (Some(condition), None) => {
                let status = condition.status();
                self.appointments
                    .find_by_patient(patient_id)
                    .await?
                    .into_iter()
                    .filter(|row| row.status == status)
                    .collect()
            }
            (None, Some(name)) => {
                self.appointments
                    .find_by_doctor_name_and_patient(name, patient_id)
                    .await?
            }
            (None, None) => self.appointments.find_by_patient(patient_id).await?,
        };

        Ok(rows.into_iter().map(AppointmentSummary::from).collect())
    }
}
