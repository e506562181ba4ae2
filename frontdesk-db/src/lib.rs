//! frontdesk-db: transactional data-access layer for hospital front-desk
//! operations
//!
//! Covers user accounts (patients, doctors, admins), doctor-department
//! assignment, registration ("visit") requests, and billing settlement.
//! Multi-table writes are all-or-nothing; read-side queries reconstruct
//! denormalized views for the presentation client.
//!
//! # Design Principles
//!
//! - Owned pool handle passed in at construction - no process-wide singleton
//! - Bound parameters everywhere - no string-built statements, no escaping
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-step operations

pub mod error;
pub mod migrations;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{DbError, DbResult};
pub use store::Store;
