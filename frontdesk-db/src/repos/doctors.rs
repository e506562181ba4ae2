//! Doctor repository: listings and department assignment
//!
//! The doctor row stores only the department id; display names come from
//! the join, so assignment is a single-column update.

use sqlx::SqlitePool;

use crate::error::{is_fk_violation, DbError, DbResult};
use crate::models::DoctorInfo;

use super::audit;

const DOCTOR_VIEW: &str = r#"
    SELECT d.doctor_id, d.name, d.gender, d.age, d.phone,
           d.department_id, dept.department_name AS department
    FROM doctors d
    LEFT JOIN departments dept ON d.department_id = dept.department_id
"#;

pub struct DoctorRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DoctorRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, doctor_id: i64) -> DbResult<DoctorInfo> {
        let query = format!("{DOCTOR_VIEW} WHERE d.doctor_id = ?");
        sqlx::query_as::<_, DoctorInfo>(&query)
            .bind(doctor_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("doctor", doctor_id))
    }

    pub async fn list(&self) -> DbResult<Vec<DoctorInfo>> {
        let query = format!("{DOCTOR_VIEW} ORDER BY d.name");
        Ok(sqlx::query_as::<_, DoctorInfo>(&query)
            .fetch_all(self.pool)
            .await?)
    }

    pub async fn list_by_department(&self, department_id: i64) -> DbResult<Vec<DoctorInfo>> {
        let query = format!("{DOCTOR_VIEW} WHERE d.department_id = ? ORDER BY d.name");
        Ok(sqlx::query_as::<_, DoctorInfo>(&query)
            .bind(department_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Assign a doctor to a department, or clear the assignment with
    /// `None`. One statement: a missing doctor shows as zero rows
    /// affected, a missing department as a foreign-key violation, so
    /// there is no check-then-update window. The audit record afterwards
    /// is best-effort.
    pub async fn assign_department(
        &self,
        doctor_id: i64,
        department_id: Option<i64>,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE doctors SET department_id = ? WHERE doctor_id = ?")
            .bind(department_id)
            .bind(doctor_id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if is_fk_violation(&e) {
                    DbError::not_found("department", department_id.unwrap_or_default())
                } else {
                    e.into()
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(DbError::not_found("doctor", doctor_id));
        }

        let details = match department_id {
            Some(dept_id) => format!("assigned doctor {doctor_id} to department {dept_id}"),
            None => format!("cleared department assignment for doctor {doctor_id}"),
        };
        audit::log_operation(self.pool, "assign_doctor", doctor_id, &details).await;

        Ok(())
    }
}
