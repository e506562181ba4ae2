//! Doctor profile views

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{column_decode, Gender};

/// Doctor profile with the department display name joined at read time.
/// Only `department_id` is stored; `department` is derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorInfo {
    pub doctor_id: i64,
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub phone: String,
    pub department_id: Option<i64>,
    pub department: Option<String>,
}

/// Writable doctor profile fields, keyed by the owning user id.
/// Department assignment is not part of the update surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub doctor_id: i64,
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub phone: String,
}

impl sqlx::FromRow<'_, SqliteRow> for DoctorInfo {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let gender: String = row.try_get("gender")?;
        Ok(DoctorInfo {
            doctor_id: row.try_get("doctor_id")?,
            name: row.try_get("name")?,
            gender: gender.parse().map_err(|e| column_decode("gender", e))?,
            age: row.try_get("age")?,
            phone: row.try_get("phone")?,
            department_id: row.try_get("department_id")?,
            department: row.try_get("department")?,
        })
    }
}
