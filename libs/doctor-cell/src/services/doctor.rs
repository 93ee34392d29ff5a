use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_database::{AppointmentStore, ClinicStore, DbError, DoctorStore};

use crate::models::{
    validate_slot_labels, CreateDoctorRequest, Doctor, DoctorError, NewDoctor, UpdateDoctorRequest,
};

pub struct DoctorService {
    doctors: Arc<dyn DoctorStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl DoctorService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            doctors: store.doctors.clone(),
            appointments: store.appointments.clone(),
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        Ok(self.doctors.find_all().await?)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        self.doctors
            .find_by_id(doctor_id)
            .await?
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    /// Create a new doctor profile
    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating new doctor profile for: {}", request.email);

        let name = required("name", &request.name)?;
        let specialty = required("specialty", &request.specialty)?;
        let email = required("email", &request.email)?;
        validate_slot_labels(&request.available_times)?;

        if self.doctors.find_by_email(&email).await?.is_some() {
            warn!("Rejecting doctor profile, email {} already registered", email);
            return Err(DoctorError::EmailAlreadyExists(email));
        }

        let doctor = self
            .doctors
            .insert(NewDoctor {
                name,
                specialty,
                email: email.clone(),
                phone: request.phone,
                available_times: request.available_times,
            })
            .await
            .map_err(|e| match e {
                DbError::Conflict(_) => DoctorError::EmailAlreadyExists(email),
                other => other.into(),
            })?;

        info!("Doctor {} created with {} slots", doctor.id, doctor.available_times.len());
        Ok(doctor)
    }

    /// Applies the fields present in `request` to an existing profile.
    pub async fn update_doctor(
        &self,
        doctor_id: i64,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        let mut doctor = self.get_doctor(doctor_id).await?;

        if let Some(name) = request.name {
            doctor.name = required("name", &name)?;
        }
        if let Some(specialty) = request.specialty {
            doctor.specialty = required("specialty", &specialty)?;
        }
        if let Some(email) = request.email {
            let email = required("email", &email)?;
            if !email.eq_ignore_ascii_case(&doctor.email) {
                if let Some(other) = self.doctors.find_by_email(&email).await? {
                    if other.id != doctor_id {
                        return Err(DoctorError::EmailAlreadyExists(email));
                    }
                }
            }
            doctor.email = email;
        }
        if request.phone.is_some() {
            doctor.phone = request.phone;
        }
        if let Some(times) = request.available_times {
            validate_slot_labels(&times)?;
            doctor.available_times = times;
        }

        let updated = self
            .doctors
            .update(doctor)
            .await?
            .ok_or(DoctorError::NotFound(doctor_id))?;

        info!("Doctor {} updated", doctor_id);
        Ok(updated)
    }

    /// Removes the doctor together with every appointment that references them.
    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<(), DoctorError> {
        self.get_doctor(doctor_id).await?;

        let removed = self.appointments.delete_by_doctor(doctor_id).await?;
        if !self.doctors.delete(doctor_id).await? {
            return Err(DoctorError::NotFound(doctor_id));
        }

        info!("Doctor {} deleted along with {} appointments", doctor_id, removed);
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, DoctorError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DoctorError::ValidationError(format!("{} is required", field)));
    }
    Ok(value.to_string())
}
