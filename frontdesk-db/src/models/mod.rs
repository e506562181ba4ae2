//! Typed entities and row mapping
//!
//! Raw rows from the store are converted here into typed entities; enum
//! columns are parsed at the boundary so invalid stored values surface as
//! decode errors, not panics.

pub mod bill;
pub mod department;
pub mod doctor;
pub mod registration;
pub mod user;
pub mod validation;

pub use bill::{Bill, BillStatus};
pub use department::{Department, NewDepartment};
pub use doctor::{DoctorInfo, DoctorProfile};
pub use registration::{RegistrationStatus, RegistrationView};
pub use user::{Gender, NewDoctor, NewPatient, NewProfile, NewUser, PatientProfile, Role, UserInfo};
pub use validation::ValidationError;

/// Wrap an enum parse failure as a sqlx column-decode error so `query_as`
/// callers see it through the normal error channel.
pub(crate) fn column_decode(column: &'static str, err: ValidationError) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(err),
    }
}
