use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use doctor_cell::services::AvailabilityService;
use doctor_cell::slots::find_slot;
use shared_database::{AppointmentStore, ClinicStore, DbError, DoctorStore, PatientStore};
use shared_models::clinic::{Doctor, NewAppointment};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest,
    RescheduleAppointmentRequest,
};

pub struct BookingService {
    doctors: Arc<dyn DoctorStore>,
    patients: Arc<dyn PatientStore>,
    appointments: Arc<dyn AppointmentStore>,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            doctors: store.doctors.clone(),
            patients: store.patients.clone(),
            appointments: store.appointments.clone(),
            availability: AvailabilityService::new(store),
        }
    }

    /// Book one of the doctor's free slots for the calling patient.
    pub async fn book_appointment(
        &self,
        patient_id: i64,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Patient {} booking doctor {} at {}",
            patient_id, request.doctor_id, request.appointment_time
        );

        if self.patients.find_by_id(patient_id).await?.is_none() {
            return Err(AppointmentError::PatientNotFound(patient_id));
        }
        let doctor = self.load_doctor(request.doctor_id).await?;
        self.ensure_slot_free(&doctor, request.appointment_time, None).await?;

        let appointment = self
            .appointments
            .insert(NewAppointment {
                doctor_id: doctor.id,
                patient_id,
                appointment_time: request.appointment_time,
                status: AppointmentStatus::Scheduled,
            })
            .await
            .map_err(|e| slot_conflict(e, doctor.id, request.appointment_time))?;

        info!(
            "Appointment {} booked with doctor {} at {}",
            appointment.id, doctor.id, appointment.appointment_time
        );
        Ok(appointment)
    }

    /// Move an appointment to another free slot of the same doctor.
    pub async fn reschedule_appointment(
        &self,
        patient_id: i64,
        appointment_id: i64,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut appointment = self.owned_appointment(patient_id, appointment_id).await?;
        let doctor = self.load_doctor(appointment.doctor_id).await?;

        self.ensure_slot_free(&doctor, request.appointment_time, Some(appointment.id))
            .await?;

        let previous = appointment.appointment_time;
        appointment.appointment_time = request.appointment_time;

        let updated = self
            .appointments
            .update(appointment)
            .await
            .map_err(|e| slot_conflict(e, doctor.id, request.appointment_time))?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        info!(
            "Appointment {} moved from {} to {}",
            appointment_id, previous, updated.appointment_time
        );
        Ok(updated)
    }

    pub async fn cancel_appointment(
        &self,
        patient_id: i64,
        appointment_id: i64,
    ) -> Result<(), AppointmentError> {
        self.owned_appointment(patient_id, appointment_id).await?;

        if !self.appointments.delete(appointment_id).await? {
            return Err(AppointmentError::NotFound(appointment_id));
        }

        info!("Appointment {} cancelled by patient {}", appointment_id, patient_id);
        Ok(())
    }

    async fn load_doctor(&self, doctor_id: i64) -> Result<Doctor, AppointmentError> {
        self.doctors
            .find_by_id(doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound(doctor_id))
    }

    async fn owned_appointment(
        &self,
        patient_id: i64,
        appointment_id: i64,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        if appointment.patient_id != patient_id {
            warn!(
                "Patient {} attempted to modify appointment {} of patient {}",
                patient_id, appointment_id, appointment.patient_id
            );
            return Err(AppointmentError::NotOwner(appointment_id));
        }
        Ok(appointment)
    }

    /// The requested time must name a configured slot that is still free on that date.
    async fn ensure_slot_free(
        &self,
        doctor: &Doctor,
        time: NaiveDateTime,
        ignore_appointment: Option<i64>,
    ) -> Result<(), AppointmentError> {
        let Some(label) = find_slot(&doctor.available_times, time.time()) else {
            return Err(AppointmentError::NotASlot {
                doctor_id: doctor.id,
                time,
            });
        };

        let free = self
            .availability
            .availability_for(doctor, time.date(), ignore_appointment)
            .await?;

        if free.iter().any(|slot| slot == label) {
            Ok(())
        } else {
            Err(AppointmentError::SlotTaken {
                doctor_id: doctor.id,
                time,
            })
        }
    }
}

fn slot_conflict(err: DbError, doctor_id: i64, time: NaiveDateTime) -> AppointmentError {
    match err {
        DbError::Conflict(_) => {
            warn!("Lost booking race for doctor {} at {}", doctor_id, time);
            AppointmentError::SlotTaken { doctor_id, time }
        }
        other => other.into(),
    }
}
