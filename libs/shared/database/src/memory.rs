use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::sync::RwLock;

use shared_models::clinic::{
    Appointment, AppointmentDetails, AppointmentStatus, Doctor, DoctorRef, NewAppointment,
    NewDoctor, NewPatient, Patient,
};

use crate::error::DbError;
use crate::store::{AppointmentStore, DoctorStore, PatientStore};

#[derive(Default)]
struct Tables {
    doctors: BTreeMap<i64, Doctor>,
    patients: BTreeMap<i64, Patient>,
    appointments: BTreeMap<i64, Appointment>,
    next_id: i64,
}

impl Tables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn slot_taken(&self, doctor_id: i64, time: NaiveDateTime, except: Option<i64>) -> bool {
        self.appointments.values().any(|a| {
            a.doctor_id == doctor_id && a.appointment_time == time && Some(a.id) != except
        })
    }

    fn details(&self, appointment: &Appointment) -> Option<AppointmentDetails> {
        let doctor = self.doctors.get(&appointment.doctor_id)?;
        let patient = self.patients.get(&appointment.patient_id)?;
        Some(AppointmentDetails {
            id: appointment.id,
            appointment_time: appointment.appointment_time,
            status: appointment.status,
            doctor: DoctorRef { id: doctor.id, name: doctor.name.clone() },
            patient: patient.clone(),
        })
    }

    /// Inner-join semantics: appointments whose doctor or patient row is gone are skipped.
    fn details_where<F>(&self, predicate: F) -> Vec<AppointmentDetails>
    where
        F: Fn(&AppointmentDetails) -> bool,
    {
        let mut rows: Vec<AppointmentDetails> = self
            .appointments
            .values()
            .filter_map(|a| self.details(a))
            .filter(|d| predicate(d))
            .collect();
        rows.sort_by_key(|d| (d.appointment_time, d.id));
        rows
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Process-local store implementing every store trait over one lock, so the
/// appointment uniqueness check and the write are atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DoctorStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Doctor>, DbError> {
        Ok(self.tables.read().await.doctors.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Doctor>, DbError> {
        Ok(self.tables.read().await.doctors.values().cloned().collect())
    }

    async fn find_by_name_containing(&self, name: &str) -> Result<Vec<Doctor>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .values()
            .filter(|d| contains_ignore_case(&d.name, name))
            .cloned()
            .collect())
    }

    async fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .values()
            .filter(|d| d.specialty.eq_ignore_ascii_case(specialty))
            .cloned()
            .collect())
    }

    async fn find_by_name_containing_and_specialty(
        &self,
        name: &str,
        specialty: &str,
    ) -> Result<Vec<Doctor>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .doctors
            .values()
            .filter(|d| contains_ignore_case(&d.name, name) && d.specialty.eq_ignore_ascii_case(specialty))
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.doctors.values().find(|d| d.email == email).cloned())
    }

    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DbError> {
        let mut tables = self.tables.write().await;
        if tables.doctors.values().any(|d| d.email == doctor.email) {
            return Err(DbError::Conflict(format!("doctor email {} already exists", doctor.email)));
        }
        let id = tables.allocate_id();
        let doctor = doctor.with_id(id);
        tables.doctors.insert(id, doctor.clone());
        Ok(doctor)
    }

    async fn update(&self, doctor: Doctor) -> Result<Option<Doctor>, DbError> {
        let mut tables = self.tables.write().await;
        match tables.doctors.get_mut(&doctor.id) {
            Some(existing) => {
                *existing = doctor.clone();
                Ok(Some(doctor))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.doctors.remove(&id).is_some())
    }
}

#[async_trait]
impl AppointmentStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn find_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, DbError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && a.appointment_time >= start && a.appointment_time <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|a| (a.appointment_time, a.id));
        Ok(rows)
    }

    async fn find_details_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.details_where(|d| {
            d.doctor.id == doctor_id && d.appointment_time >= start && d.appointment_time <= end
        }))
    }

    async fn find_by_patient(&self, patient_id: i64) -> Result<Vec<AppointmentDetails>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.details_where(|d| d.patient.id == patient_id))
    }

    async fn find_by_doctor_name_and_patient(
        &self,
        doctor_name: &str,
        patient_id: i64,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.details_where(|d| {
            d.patient.id == patient_id && contains_ignore_case(&d.doctor.name, doctor_name)
        }))
    }

    async fn find_by_doctor_name_and_patient_and_status(
        &self,
        doctor_name: &str,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.details_where(|d| {
            d.patient.id == patient_id
                && d.status == status
                && contains_ignore_case(&d.doctor.name, doctor_name)
        }))
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        let mut tables = self.tables.write().await;
        if tables.slot_taken(appointment.doctor_id, appointment.appointment_time, None) {
            return Err(DbError::Conflict(format!(
                "doctor {} already booked at {}",
                appointment.doctor_id, appointment.appointment_time
            )));
        }
        let id = tables.allocate_id();
        let appointment = appointment.with_id(id);
        tables.appointments.insert(id, appointment.clone());
        Ok(appointment)
    }

    async fn update(&self, appointment: Appointment) -> Result<Option<Appointment>, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.appointments.contains_key(&appointment.id) {
            return Ok(None);
        }
        if tables.slot_taken(appointment.doctor_id, appointment.appointment_time, Some(appointment.id)) {
            return Err(DbError::Conflict(format!(
                "doctor {} already booked at {}",
                appointment.doctor_id, appointment.appointment_time
            )));
        }
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(Some(appointment))
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        Ok(self.tables.write().await.appointments.remove(&id).is_some())
    }

    async fn delete_by_doctor(&self, doctor_id: i64) -> Result<usize, DbError> {
        let mut tables = self.tables.write().await;
        let before = tables.appointments.len();
        tables.appointments.retain(|_, a| a.doctor_id != doctor_id);
        Ok(before - tables.appointments.len())
    }
}

#[async_trait]
impl PatientStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, DbError> {
        Ok(self.tables.read().await.patients.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables.patients.values().find(|p| p.email == email).cloned())
    }

    async fn insert(&self, patient: NewPatient) -> Result<Patient, DbError> {
        let mut tables = self.tables.write().await;
        if tables.patients.values().any(|p| p.email == patient.email) {
            return Err(DbError::Conflict(format!("patient email {} already exists", patient.email)));
        }
        let id = tables.allocate_id();
        let patient = patient.with_id(id);
        tables.patients.insert(id, patient.clone());
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    async fn seeded() -> (MemoryStore, Doctor, Patient) {
        let store = MemoryStore::new();
        let doctor = DoctorStore::insert(&store, NewDoctor {
            name: "Dr. Grace Hopper".to_string(),
            specialty: "Cardiology".to_string(),
            email: "grace@clinic.test".to_string(),
            phone: None,
            available_times: vec!["09:00".to_string(), "10:00".to_string()],
        })
        .await
        .unwrap();
        let patient = PatientStore::insert(&store, NewPatient {
            name: "Alan Turing".to_string(),
            email: "alan@example.com".to_string(),
            phone: "555-0100".to_string(),
            address: "Bletchley Park".to_string(),
        })
        .await
        .unwrap();
        (store, doctor, patient)
    }

    fn booking(doctor: &Doctor, patient: &Patient, time: NaiveDateTime) -> NewAppointment {
        NewAppointment {
            doctor_id: doctor.id,
            patient_id: patient.id,
            appointment_time: time,
            status: AppointmentStatus::Scheduled,
        }
    }

    #[tokio::test]
    async fn second_booking_at_same_time_conflicts() {
        let (store, doctor, patient) = seeded().await;

        AppointmentStore::insert(&store, booking(&doctor, &patient, at(9, 0))).await.unwrap();
        let second = AppointmentStore::insert(&store, booking(&doctor, &patient, at(9, 0))).await;

        assert_matches!(second, Err(DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_may_keep_its_own_slot() {
        let (store, doctor, patient) = seeded().await;
        let mut appointment = AppointmentStore::insert(&store, booking(&doctor, &patient, at(9, 0)))
            .await
            .unwrap();

        appointment.status = AppointmentStatus::Completed;
        let updated = AppointmentStore::update(&store, appointment.clone()).await.unwrap();
        assert_eq!(updated, Some(appointment));
    }

    #[tokio::test]
    async fn time_range_is_inclusive() {
        let (store, doctor, patient) = seeded().await;
        AppointmentStore::insert(&store, booking(&doctor, &patient, at(9, 0))).await.unwrap();
        AppointmentStore::insert(&store, booking(&doctor, &patient, at(10, 0))).await.unwrap();

        let rows = store
            .find_by_doctor_and_time_range(doctor.id, at(9, 0), at(10, 0))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn doctor_name_match_ignores_case() {
        let (store, doctor, patient) = seeded().await;
        AppointmentStore::insert(&store, booking(&doctor, &patient, at(9, 0))).await.unwrap();

        let rows = store.find_by_doctor_name_and_patient("HOPPER", patient.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].doctor.name, "Dr. Grace Hopper");
    }

    #[tokio::test]
    async fn delete_by_doctor_reports_removed_rows() {
        let (store, doctor, patient) = seeded().await;
        AppointmentStore::insert(&store, booking(&doctor, &patient, at(9, 0))).await.unwrap();
        AppointmentStore::insert(&store, booking(&doctor, &patient, at(10, 0))).await.unwrap();

        assert_eq!(store.delete_by_doctor(doctor.id).await.unwrap(), 2);
        assert!(store.find_by_patient(patient.id).await.unwrap().is_empty());
    }
}
