use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_database::{ClinicStore, DbError, PatientStore};

use crate::models::{NewPatient, Patient, PatientError, RegisterPatientRequest};

pub struct PatientService {
    patients: Arc<dyn PatientStore>,
}

impl PatientService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            patients: store.patients.clone(),
        }
    }

    pub async fn register_patient(
        &self,
        request: RegisterPatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Registering patient: {}", request.email);

        let email = required("email", &request.email)?;
        let new_patient = NewPatient {
            name: required("name", &request.name)?,
            email: email.clone(),
            phone: required("phone", &request.phone)?,
            address: required("address", &request.address)?,
        };

        if self.patients.find_by_email(&email).await?.is_some() {
            warn!("Rejecting registration, email {} already registered", email);
            return Err(PatientError::EmailAlreadyExists(email));
        }

        let patient = self.patients.insert(new_patient).await.map_err(|e| match e {
            DbError::Conflict(_) => PatientError::EmailAlreadyExists(email),
            other => other.into(),
        })?;

        info!("Patient {} registered", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        self.patients
            .find_by_id(patient_id)
            .await?
            .ok_or(PatientError::NotFound(patient_id))
    }
}

fn required(field: &str, value: &str) -> Result<String, PatientError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PatientError::ValidationError(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
