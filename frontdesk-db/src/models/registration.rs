//! Registrations: the unit of scheduling
//!
//! Status machine: pending -> completed (via billing) or
//! pending -> cancelled. Both end states are terminal.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{column_decode, BillStatus, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Completed,
    Cancelled,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Completed => "completed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationStatus::Pending),
            "completed" => Ok(RegistrationStatus::Completed),
            "cancelled" => Ok(RegistrationStatus::Cancelled),
            other => Err(ValidationError::InvalidVariant {
                field: "registration status",
                value: other.to_string(),
            }),
        }
    }
}

/// Denormalized registration row for presentation: patient and doctor
/// names, department, and the optional bill joined in one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationView {
    pub registration_id: i64,
    pub registration_date: NaiveDate,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub status: RegistrationStatus,
    pub notes: String,
    pub patient_name: String,
    pub doctor_name: String,
    pub doctor_department: Option<String>,
    pub has_bill: bool,
    /// 0 when no bill exists.
    pub bill_amount: f64,
    pub bill_status: Option<BillStatus>,
}

impl sqlx::FromRow<'_, SqliteRow> for RegistrationView {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        let bill_status: Option<String> = row.try_get("bill_status")?;
        let has_bill: i64 = row.try_get("has_bill")?;
        Ok(RegistrationView {
            registration_id: row.try_get("registration_id")?,
            registration_date: row.try_get("registration_date")?,
            patient_id: row.try_get("patient_id")?,
            doctor_id: row.try_get("doctor_id")?,
            status: status.parse().map_err(|e| column_decode("status", e))?,
            notes: row.try_get("notes")?,
            patient_name: row.try_get("patient_name")?,
            doctor_name: row.try_get("doctor_name")?,
            doctor_department: row.try_get("doctor_department")?,
            has_bill: has_bill != 0,
            bill_amount: row.try_get("bill_amount")?,
            bill_status: bill_status
                .map(|s| s.parse().map_err(|e| column_decode("bill_status", e)))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrip() {
        for status in [
            RegistrationStatus::Pending,
            RegistrationStatus::Completed,
            RegistrationStatus::Cancelled,
        ] {
            assert_eq!(
                status.as_str().parse::<RegistrationStatus>().unwrap(),
                status
            );
        }
    }

    #[test]
    fn unknown_status_rejected() {
        assert!("open".parse::<RegistrationStatus>().is_err());
    }
}
