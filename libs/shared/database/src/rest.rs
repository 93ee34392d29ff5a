use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;
use urlencoding::encode;

use shared_models::clinic::{
    Appointment, AppointmentDetails, AppointmentStatus, Doctor, NewAppointment, NewDoctor,
    NewPatient, Patient,
};

use crate::error::DbError;
use crate::store::{AppointmentStore, DoctorStore, PatientStore};
use crate::supabase::SupabaseClient;

const DOCTORS: &str = "/rest/v1/doctors";
const PATIENTS: &str = "/rest/v1/patients";
const APPOINTMENTS: &str = "/rest/v1/appointments";

/// Embeds the doctor and patient rows so one query yields [`AppointmentDetails`].
pub const DETAILS_SELECT: &str =
    "id,appointment_time,status,doctor:doctors!inner(id,name),patient:patients!inner(id,name,email,phone,address)";

/// Postgres keeps microseconds and rounds anything finer, so the bound is truncated here.
fn timestamp(value: NaiveDateTime) -> String {
    encode(&value.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()).into_owned()
}

/// Escapes LIKE wildcards and the PostgREST `*` alias so `text` matches literally.
fn like_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_' | '*') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    encode(&escaped).into_owned()
}

fn contains_pattern(text: &str) -> String {
    format!("ilike.*{}*", like_literal(text))
}

fn equals_ignoring_case(text: &str) -> String {
    format!("ilike.{}", like_literal(text))
}

fn first_row<T>(rows: Vec<T>, what: &str) -> Result<T, DbError> {
    rows.into_iter().next().ok_or_else(|| DbError::Api {
        status: 200,
        message: format!("Store returned no {} row", what),
    })
}

async fn fetch<T: DeserializeOwned>(client: &SupabaseClient, path: &str) -> Result<Vec<T>, DbError> {
    client.request(Method::GET, path, None).await
}

// ==============================================================================
// DOCTORS
// ==============================================================================

pub struct RestDoctorStore {
    supabase: SupabaseClient,
}

impl RestDoctorStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorStore for RestDoctorStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Doctor>, DbError> {
        let path = format!("{}?id=eq.{}", DOCTORS, id);
        let rows: Vec<Doctor> = fetch(&self.supabase, &path).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_all(&self) -> Result<Vec<Doctor>, DbError> {
        let path = format!("{}?order=id.asc", DOCTORS);
        fetch(&self.supabase, &path).await
    }

    async fn find_by_name_containing(&self, name: &str) -> Result<Vec<Doctor>, DbError> {
        let path = format!("{}?name={}&order=id.asc", DOCTORS, contains_pattern(name));
        fetch(&self.supabase, &path).await
    }

    async fn find_by_specialty(&self, specialty: &str) -> Result<Vec<Doctor>, DbError> {
        let path = format!("{}?specialty={}&order=id.asc", DOCTORS, equals_ignoring_case(specialty));
        fetch(&self.supabase, &path).await
    }

    async fn find_by_name_containing_and_specialty(
        &self,
        name: &str,
        specialty: &str,
    ) -> Result<Vec<Doctor>, DbError> {
        let path = format!(
            "{}?name={}&specialty={}&order=id.asc",
            DOCTORS,
            contains_pattern(name),
            equals_ignoring_case(specialty)
        );
        fetch(&self.supabase, &path).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, DbError> {
        let path = format!("{}?email=eq.{}", DOCTORS, encode(email));
        let rows: Vec<Doctor> = fetch(&self.supabase, &path).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, doctor: NewDoctor) -> Result<Doctor, DbError> {
        debug!("Inserting doctor {}", doctor.email);
        let rows: Vec<Doctor> = self
            .supabase
            .request_returning(Method::POST, DOCTORS, Some(json!(doctor)))
            .await?;
        first_row(rows, "doctor")
    }

    async fn update(&self, doctor: Doctor) -> Result<Option<Doctor>, DbError> {
        let path = format!("{}?id=eq.{}", DOCTORS, doctor.id);
        let body = json!({
            "name": doctor.name,
            "specialty": doctor.specialty,
            "email": doctor.email,
            "phone": doctor.phone,
            "available_times": doctor.available_times,
        });
        let rows: Vec<Doctor> = self
            .supabase
            .request_returning(Method::PATCH, &path, Some(body))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let path = format!("{}?id=eq.{}", DOCTORS, id);
        let rows: Vec<Value> = self.supabase.request_returning(Method::DELETE, &path, None).await?;
        Ok(!rows.is_empty())
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

pub struct RestAppointmentStore {
    supabase: SupabaseClient,
}

impl RestAppointmentStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }

    fn details_path(&self, filters: &str) -> String {
        format!(
            "{}?select={}&{}&order=appointment_time.asc",
            APPOINTMENTS, DETAILS_SELECT, filters
        )
    }
}

#[async_trait]
impl AppointmentStore for RestAppointmentStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, DbError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS, id);
        let rows: Vec<Appointment> = fetch(&self.supabase, &path).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Appointment>, DbError> {
        let path = format!(
            "{}?doctor_id=eq.{}&appointment_time=gte.{}&appointment_time=lte.{}&order=appointment_time.asc",
            APPOINTMENTS,
            doctor_id,
            timestamp(start),
            timestamp(end)
        );
        fetch(&self.supabase, &path).await
    }

    async fn find_details_by_doctor_and_time_range(
        &self,
        doctor_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let path = self.details_path(&format!(
            "doctor_id=eq.{}&appointment_time=gte.{}&appointment_time=lte.{}",
            doctor_id,
            timestamp(start),
            timestamp(end)
        ));
        fetch(&self.supabase, &path).await
    }

    async fn find_by_patient(&self, patient_id: i64) -> Result<Vec<AppointmentDetails>, DbError> {
        let path = self.details_path(&format!("patient_id=eq.{}", patient_id));
        fetch(&self.supabase, &path).await
    }

    async fn find_by_doctor_name_and_patient(
        &self,
        doctor_name: &str,
        patient_id: i64,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let path = self.details_path(&format!(
            "patient_id=eq.{}&doctor.name={}",
            patient_id,
            contains_pattern(doctor_name)
        ));
        fetch(&self.supabase, &path).await
    }

    async fn find_by_doctor_name_and_patient_and_status(
        &self,
        doctor_name: &str,
        patient_id: i64,
        status: AppointmentStatus,
    ) -> Result<Vec<AppointmentDetails>, DbError> {
        let path = self.details_path(&format!(
            "patient_id=eq.{}&status=eq.{}&doctor.name={}",
            patient_id,
            status.code(),
            contains_pattern(doctor_name)
        ));
        fetch(&self.supabase, &path).await
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, DbError> {
        debug!(
            "Inserting appointment for doctor {} at {}",
            appointment.doctor_id, appointment.appointment_time
        );
        // The (doctor_id, appointment_time) unique constraint turns a lost race into a 409.
        let rows: Vec<Appointment> = self
            .supabase
            .request_returning(Method::POST, APPOINTMENTS, Some(json!(appointment)))
            .await?;
        first_row(rows, "appointment")
    }

    async fn update(&self, appointment: Appointment) -> Result<Option<Appointment>, DbError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS, appointment.id);
        let body = json!({
            "doctor_id": appointment.doctor_id,
            "patient_id": appointment.patient_id,
            "appointment_time": appointment.appointment_time,
            "status": appointment.status,
        });
        let rows: Vec<Appointment> = self
            .supabase
            .request_returning(Method::PATCH, &path, Some(body))
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let path = format!("{}?id=eq.{}", APPOINTMENTS, id);
        let rows: Vec<Value> = self.supabase.request_returning(Method::DELETE, &path, None).await?;
        Ok(!rows.is_empty())
    }

    async fn delete_by_doctor(&self, doctor_id: i64) -> Result<usize, DbError> {
        let path = format!("{}?doctor_id=eq.{}", APPOINTMENTS, doctor_id);
        let rows: Vec<Value> = self.supabase.request_returning(Method::DELETE, &path, None).await?;
        Ok(rows.len())
    }
}

// ==============================================================================
// PATIENTS
// ==============================================================================

pub struct RestPatientStore {
    supabase: SupabaseClient,
}

impl RestPatientStore {
    pub fn new(supabase: SupabaseClient) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl PatientStore for RestPatientStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>, DbError> {
        let path = format!("{}?id=eq.{}", PATIENTS, id);
        let rows: Vec<Patient> = fetch(&self.supabase, &path).await?;
        Ok(rows.into_iter().next())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, DbError> {
        let path = format!("{}?email=eq.{}", PATIENTS, encode(email));
        let rows: Vec<Patient> = fetch(&self.supabase, &path).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, patient: NewPatient) -> Result<Patient, DbError> {
        debug!("Inserting patient {}", patient.email);
        let rows: Vec<Patient> = self
            .supabase
            .request_returning(Method::POST, PATIENTS, Some(json!(patient)))
            .await?;
        first_row(rows, "patient")
    }
}
