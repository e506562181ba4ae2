//! Departments: organizational units doctors are assigned to

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: i64,
    pub department_name: String,
    pub description: String,
    pub contact_phone: String,
    pub location: String,
}

impl sqlx::FromRow<'_, SqliteRow> for Department {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Department {
            department_id: row.try_get("department_id")?,
            department_name: row.try_get("department_name")?,
            description: row.try_get("description")?,
            contact_phone: row.try_get("contact_phone")?,
            location: row.try_get("location")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub department_name: String,
    pub description: String,
    pub contact_phone: String,
    pub location: String,
}
