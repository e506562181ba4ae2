//! Department repository
//!
//! Name uniqueness comes from the UNIQUE constraint; add and rename report
//! collisions as conflicts. Deletion is refused while any doctor still
//! references the department.

use sqlx::{Row, SqlitePool};

use crate::error::{is_unique_violation, DbError, DbResult};
use crate::models::{Department, NewDepartment};

pub struct DepartmentRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> DepartmentRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a department; a duplicate name is a conflict.
    pub async fn add(&self, dept: &NewDepartment) -> DbResult<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO departments (department_name, description, contact_phone, location)
            VALUES (?, ?, ?, ?)
            RETURNING department_id
            "#,
        )
        .bind(&dept.department_name)
        .bind(&dept.description)
        .bind(&dept.contact_phone)
        .bind(&dept.location)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::conflict(format!(
                    "department name '{}' already exists",
                    dept.department_name
                ))
            } else {
                e.into()
            }
        })?;

        Ok(row.try_get("department_id")?)
    }

    /// Update name and contact fields. Renaming onto another department's
    /// name is a conflict.
    pub async fn update(&self, dept: &Department) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE departments
            SET department_name = ?, description = ?, contact_phone = ?, location = ?
            WHERE department_id = ?
            "#,
        )
        .bind(&dept.department_name)
        .bind(&dept.description)
        .bind(&dept.contact_phone)
        .bind(&dept.location)
        .bind(dept.department_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::conflict(format!(
                    "department name '{}' already exists",
                    dept.department_name
                ))
            } else {
                e.into()
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("department", dept.department_id));
        }
        Ok(())
    }

    /// Delete a department, refusing while any doctor references it.
    pub async fn delete(&self, department_id: i64) -> DbResult<()> {
        let (doctor_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM doctors WHERE department_id = ?")
                .bind(department_id)
                .fetch_one(self.pool)
                .await?;

        if doctor_count > 0 {
            return Err(DbError::conflict(format!(
                "cannot delete department: {doctor_count} doctor(s) still assigned"
            )));
        }

        let result = sqlx::query("DELETE FROM departments WHERE department_id = ?")
            .bind(department_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("department", department_id));
        }
        Ok(())
    }

    pub async fn get(&self, department_id: i64) -> DbResult<Department> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT department_id, department_name, description, contact_phone, location
            FROM departments
            WHERE department_id = ?
            "#,
        )
        .bind(department_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("department", department_id))
    }

    pub async fn get_by_name(&self, name: &str) -> DbResult<Department> {
        sqlx::query_as::<_, Department>(
            r#"
            SELECT department_id, department_name, description, contact_phone, location
            FROM departments
            WHERE department_name = ?
            "#,
        )
        .bind(name)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("department", name.to_string()))
    }

    pub async fn list(&self) -> DbResult<Vec<Department>> {
        Ok(sqlx::query_as::<_, Department>(
            r#"
            SELECT department_id, department_name, description, contact_phone, location
            FROM departments
            ORDER BY department_name
            "#,
        )
        .fetch_all(self.pool)
        .await?)
    }

    /// Departments a patient can register under: those with at least one
    /// assigned doctor.
    pub async fn list_available_for_registration(&self) -> DbResult<Vec<Department>> {
        Ok(sqlx::query_as::<_, Department>(
            r#"
            SELECT DISTINCT d.department_id, d.department_name,
                   d.description, d.contact_phone, d.location
            FROM departments d
            JOIN doctors doc ON doc.department_id = d.department_id
            ORDER BY d.department_name
            "#,
        )
        .fetch_all(self.pool)
        .await?)
    }
}
