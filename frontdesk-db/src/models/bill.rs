//! Bills: monetary settlement records
//!
//! A bill exists only as the side effect of settling a registration; the
//! link table enforces the 1:1 relationship.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{column_decode, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Unpaid,
    Paid,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Unpaid => "unpaid",
            BillStatus::Paid => "paid",
        }
    }
}

impl FromStr for BillStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(BillStatus::Unpaid),
            "paid" => Ok(BillStatus::Paid),
            other => Err(ValidationError::InvalidVariant {
                field: "bill status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: i64,
    pub bill_date: NaiveDate,
    pub amount: f64,
    pub status: BillStatus,
}

impl sqlx::FromRow<'_, SqliteRow> for Bill {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status: String = row.try_get("status")?;
        Ok(Bill {
            bill_id: row.try_get("bill_id")?,
            bill_date: row.try_get("bill_date")?,
            amount: row.try_get("amount")?,
            status: status.parse().map_err(|e| column_decode("status", e))?,
        })
    }
}
