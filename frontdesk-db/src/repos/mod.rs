//! Repository implementations for front-desk operations
//!
//! One repo per concern, each borrowing the pool. Shared patterns:
//! - Multi-table writes run in a transaction; any step failing rolls the
//!   whole operation back
//! - Uniqueness and referential integrity come from DB constraints;
//!   violations are caught and mapped to `Conflict` (no check-then-insert)
//! - List operations use JOINs (no N+1)

pub mod audit;
pub mod billing;
pub mod departments;
pub mod doctors;
pub mod registrations;
pub mod users;

pub use billing::BillingRepo;
pub use departments::DepartmentRepo;
pub use doctors::DoctorRepo;
pub use registrations::RegistrationRepo;
pub use users::UserRepo;
