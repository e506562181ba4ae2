//! User repository: accounts, role profiles, authentication
//!
//! Registration inserts the account row and its role profile in one
//! transaction; a duplicate username surfaces from the unique index, not a
//! pre-check. Passwords are hashed and verified in-process; login reports
//! the same error for unknown usernames and wrong passwords.

use sqlx::{Row, SqlitePool};

use frontdesk_core::password;

use crate::error::{is_fk_violation, is_unique_violation, DbError, DbResult};
use crate::models::{DoctorProfile, NewProfile, NewUser, PatientProfile, UserInfo};

/// Unified role view: profile columns resolve through the role-qualified
/// joins, so an admin row carries NULLs throughout.
const UNIFIED_VIEW: &str = r#"
    SELECT u.user_id, u.username, u.role,
           COALESCE(p.name, d.name) AS name,
           COALESCE(p.gender, d.gender) AS gender,
           COALESCE(p.age, d.age) AS age,
           COALESCE(p.phone, d.phone) AS phone,
           p.address AS address,
           p.id_card AS id_card,
           dept.department_name AS department
    FROM users u
    LEFT JOIN patients p ON u.user_id = p.patient_id AND u.role = 'patient'
    LEFT JOIN doctors d ON u.user_id = d.doctor_id AND u.role = 'doctor'
    LEFT JOIN departments dept ON d.department_id = dept.department_id
"#;

pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Register an account with its role profile (atomic).
    ///
    /// Returns the generated user id. A duplicate username or a doctor
    /// profile pointing at a missing department rolls the whole
    /// transaction back.
    pub async fn register(&self, new_user: &NewUser) -> DbResult<i64> {
        let password_hash = password::hash(&new_user.password)
            .map_err(|e| DbError::Password(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, role)
            VALUES (?, ?, ?)
            RETURNING user_id
            "#,
        )
        .bind(&new_user.username)
        .bind(&password_hash)
        .bind(new_user.profile.role().as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::conflict(format!("username '{}' already exists", new_user.username))
            } else {
                e.into()
            }
        })?;

        let user_id: i64 = row.try_get("user_id")?;

        match &new_user.profile {
            NewProfile::Patient(p) => {
                sqlx::query(
                    r#"
                    INSERT INTO patients (patient_id, name, gender, age, address, phone, id_card)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(user_id)
                .bind(&p.name)
                .bind(p.gender.as_str())
                .bind(p.age)
                .bind(&p.address)
                .bind(&p.phone)
                .bind(&p.id_card)
                .execute(&mut *tx)
                .await?;
            }
            NewProfile::Doctor(d) => {
                sqlx::query(
                    r#"
                    INSERT INTO doctors (doctor_id, name, gender, age, phone, department_id)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(user_id)
                .bind(&d.name)
                .bind(d.gender.as_str())
                .bind(d.age)
                .bind(&d.phone)
                .bind(d.department_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    if is_fk_violation(&e) {
                        DbError::conflict("department does not exist".to_string())
                    } else {
                        e.into()
                    }
                })?;
            }
            NewProfile::Admin => {}
        }

        tx.commit().await?;
        tracing::info!(user_id, role = new_user.profile.role().as_str(), "registered user");
        Ok(user_id)
    }

    /// Authenticate and return the unified role view.
    ///
    /// The password hash is fetched and verified in-process; the plaintext
    /// never reaches a statement.
    pub async fn login(&self, username: &str, plain_password: &str) -> DbResult<UserInfo> {
        let row = sqlx::query("SELECT user_id, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        let Some(row) = row else {
            return Err(DbError::InvalidCredentials);
        };

        let user_id: i64 = row.try_get("user_id")?;
        let stored_hash: String = row.try_get("password_hash")?;

        let matches = password::verify(plain_password, &stored_hash)
            .map_err(|e| DbError::Password(e.to_string()))?;
        if !matches {
            return Err(DbError::InvalidCredentials);
        }

        self.get(user_id).await
    }

    /// Unified role view by user id.
    pub async fn get(&self, user_id: i64) -> DbResult<UserInfo> {
        let query = format!("{UNIFIED_VIEW} WHERE u.user_id = ?");
        sqlx::query_as::<_, UserInfo>(&query)
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", user_id))
    }

    /// Patient profile by id.
    pub async fn get_patient(&self, patient_id: i64) -> DbResult<PatientProfile> {
        sqlx::query_as::<_, PatientProfile>(
            r#"
            SELECT patient_id, name, gender, age, phone, address, id_card
            FROM patients
            WHERE patient_id = ?
            "#,
        )
        .bind(patient_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("patient", patient_id))
    }

    /// Update a patient's profile fields. Role and username are immutable
    /// and not part of the update surface.
    pub async fn update_patient(&self, profile: &PatientProfile) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE patients
            SET name = ?, gender = ?, age = ?, address = ?, phone = ?, id_card = ?
            WHERE patient_id = ?
            "#,
        )
        .bind(&profile.name)
        .bind(profile.gender.as_str())
        .bind(profile.age)
        .bind(&profile.address)
        .bind(&profile.phone)
        .bind(&profile.id_card)
        .bind(profile.patient_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("patient", profile.patient_id));
        }
        Ok(())
    }

    /// Update a doctor's personal fields. Department assignment goes
    /// through `DoctorRepo::assign_department`, not here.
    pub async fn update_doctor(&self, profile: &DoctorProfile) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE doctors
            SET name = ?, gender = ?, age = ?, phone = ?
            WHERE doctor_id = ?
            "#,
        )
        .bind(&profile.name)
        .bind(profile.gender.as_str())
        .bind(profile.age)
        .bind(&profile.phone)
        .bind(profile.doctor_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("doctor", profile.doctor_id));
        }
        Ok(())
    }

    /// Change a password after verifying the old one.
    pub async fn change_password(
        &self,
        user_id: i64,
        old_password: &str,
        new_password: &str,
    ) -> DbResult<()> {
        let row = sqlx::query("SELECT password_hash FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", user_id))?;

        let stored_hash: String = row.try_get("password_hash")?;
        let matches = password::verify(old_password, &stored_hash)
            .map_err(|e| DbError::Password(e.to_string()))?;
        if !matches {
            return Err(DbError::InvalidCredentials);
        }

        let new_hash =
            password::hash(new_password).map_err(|e| DbError::Password(e.to_string()))?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE user_id = ?")
            .bind(&new_hash)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
