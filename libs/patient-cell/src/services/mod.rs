pub mod history;
pub mod patient;

pub use history::AppointmentHistoryService;
pub use patient::PatientService;
