use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use shared_database::{AppointmentStore, ClinicStore, DoctorStore};

use crate::models::{Doctor, DoctorError};
use crate::slots::{day_bounds, free_slots};

pub struct AvailabilityService {
    doctors: Arc<dyn DoctorStore>,
    appointments: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(store: &ClinicStore) -> Self {
        Self {
            doctors: store.doctors.clone(),
            appointments: store.appointments.clone(),
        }
    }

    /// Slots of the doctor's configured schedule that no appointment occupies on `date`.
    ///
    /// An unknown doctor yields an empty list rather than an error. Store failures
    /// are propagated.
    pub async fn compute_availability(
        &self,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<String>, DoctorError> {
        debug!("Computing availability for doctor {} on {}", doctor_id, date);

        let Some(doctor) = self.doctors.find_by_id(doctor_id).await? else {
            warn!("Doctor {} not found, reporting no availability", doctor_id);
            return Ok(Vec::new());
        };

        self.availability_for(&doctor, date, None).await
    }

    /// Same as [`compute_availability`](Self::compute_availability) for an already
    /// loaded doctor. `ignore_appointment` leaves one booking out of the subtraction,
    /// which lets a reschedule keep its current slot.
    pub async fn availability_for(
        &self,
        doctor: &Doctor,
        date: NaiveDate,
        ignore_appointment: Option<i64>,
    ) -> Result<Vec<String>, DoctorError> {
        if doctor.available_times.is_empty() {
            return Ok(Vec::new());
        }

        let (start, end) = day_bounds(date);
        let booked: Vec<NaiveTime> = self
            .appointments
            .find_by_doctor_and_time_range(doctor.id, start, end)
            .await?
            .into_iter()
            .filter(|appointment| Some(appointment.id) != ignore_appointment)
            .map(|appointment| appointment.appointment_time.time())
            .collect();

        let free = free_slots(&doctor.available_times, &booked);
        debug!(
            "Doctor {} has {} of {} slots free on {}",
            doctor.id,
            free.len(),
            doctor.available_times.len(),
            date
        );
        Ok(free)
    }
}
