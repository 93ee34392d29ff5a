pub mod error;
pub mod memory;
pub mod rest;
pub mod store;
pub mod supabase;

pub use error::DbError;
pub use memory::MemoryStore;
pub use store::{AppointmentStore, ClinicStore, DoctorStore, PatientStore};
