//! User accounts and role profiles
//!
//! A user owns exactly one role-specific profile (patient or doctor; admins
//! have none), created in the same transaction as the account row. The role
//! is fixed at construction through `NewProfile` and never updated.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{column_decode, ValidationError};

/// Account role; determines which profile table and operations apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            other => Err(ValidationError::InvalidVariant {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(ValidationError::InvalidVariant {
                field: "gender",
                value: other.to_string(),
            }),
        }
    }
}

/// Unified account view returned by login and user lookup.
///
/// Profile fields are populated only for the relevant role; an admin
/// carries `None` throughout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<i64>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub id_card: Option<String>,
    /// Department display name, derived by join; doctors only.
    pub department: Option<String>,
}

impl sqlx::FromRow<'_, SqliteRow> for UserInfo {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let gender: Option<String> = row.try_get("gender")?;
        Ok(UserInfo {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            role: role.parse().map_err(|e| column_decode("role", e))?,
            name: row.try_get("name")?,
            gender: gender
                .map(|g| g.parse().map_err(|e| column_decode("gender", e)))
                .transpose()?,
            age: row.try_get("age")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            id_card: row.try_get("id_card")?,
            department: row.try_get("department")?,
        })
    }
}

/// Patient profile row, keyed by the owning user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub patient_id: i64,
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub phone: String,
    pub address: String,
    pub id_card: String,
}

impl sqlx::FromRow<'_, SqliteRow> for PatientProfile {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let gender: String = row.try_get("gender")?;
        Ok(PatientProfile {
            patient_id: row.try_get("patient_id")?,
            name: row.try_get("name")?,
            gender: gender.parse().map_err(|e| column_decode("gender", e))?,
            age: row.try_get("age")?,
            phone: row.try_get("phone")?,
            address: row.try_get("address")?,
            id_card: row.try_get("id_card")?,
        })
    }
}

/// Registration request for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub profile: NewProfile,
}

/// Role-specific profile data supplied at registration.
///
/// The role is derived from the variant, so an out-of-range role string is
/// unrepresentable and rejected before any write.
#[derive(Debug, Clone)]
pub enum NewProfile {
    Patient(NewPatient),
    Doctor(NewDoctor),
    Admin,
}

impl NewProfile {
    pub fn role(&self) -> Role {
        match self {
            NewProfile::Patient(_) => Role::Patient,
            NewProfile::Doctor(_) => Role::Doctor,
            NewProfile::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub phone: String,
    pub address: String,
    pub id_card: String,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub gender: Gender,
    pub age: i64,
    pub phone: String,
    pub department_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_roundtrip() {
        for role in [Role::Patient, Role::Doctor, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let err = "superuser".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("superuser"));
    }

    #[test]
    fn profile_determines_role() {
        let profile = NewProfile::Doctor(NewDoctor {
            name: "Dr. Wu".into(),
            gender: Gender::Female,
            age: 41,
            phone: "555-0100".into(),
            department_id: None,
        });
        assert_eq!(profile.role(), Role::Doctor);
    }
}
