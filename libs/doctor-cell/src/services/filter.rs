use std::sync::Arc;

use tracing::debug;

use shared_database::{ClinicStore, DoctorStore};

use crate::models::{Doctor, DoctorError, DoctorFilter};

pub struct DoctorFilterService {
    doctors: Arc<dyn DoctorStore>,
}

impl DoctorFilterService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            doctors: store.doctors.clone(),
        }
    }

    /// Narrows the directory by name, specialty and time period.
    ///
    /// Name and specialty are pushed to the store (combined query when both are
    /// given); the period is applied afterwards in memory. Store order is kept.
    pub async fn filter_doctors(&self, filter: &DoctorFilter) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Filtering doctors with {:?}", filter);

        let candidates = match (filter.name.as_deref(), filter.specialty.as_deref()) {
            (Some(name), Some(specialty)) => {
                self.doctors
                    .find_by_name_containing_and_specialty(name, specialty)
                    .await?
            }
            (Some(name), None) => self.doctors.find_by_name_containing(name).await?,
            (None, Some(specialty)) => self.doctors.find_by_specialty(specialty).await?,
            (None, None) => self.doctors.find_all().await?,
        };

        let doctors = match filter.time_period {
            Some(period) => candidates
                .into_iter()
                .filter(|doctor| period.matches_any(&doctor.available_times))
                .collect(),
            None => candidates,
        };

        debug!("Doctor filter matched {} doctors", doctors.len());
        Ok(doctors)
    }
}
