//! Registration repository
//!
//! Reads reconstruct the denormalized view (patient, doctor, department,
//! optional bill) in a single four-way join, most recent date first. The
//! only status transitions are pending -> cancelled (here) and
//! pending -> completed (through billing).

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::error::{is_fk_violation, DbError, DbResult};
use crate::models::RegistrationView;

const REGISTRATION_VIEW: &str = r#"
    SELECT r.registration_id, r.registration_date, r.patient_id, r.doctor_id,
           r.status, r.notes,
           p.name AS patient_name,
           d.name AS doctor_name,
           dept.department_name AS doctor_department,
           rb.bill_id IS NOT NULL AS has_bill,
           COALESCE(b.amount, 0.0) AS bill_amount,
           b.status AS bill_status
    FROM registrations r
    JOIN patients p ON r.patient_id = p.patient_id
    JOIN doctors d ON r.doctor_id = d.doctor_id
    LEFT JOIN departments dept ON d.department_id = dept.department_id
    LEFT JOIN registration_bills rb ON r.registration_id = rb.registration_id
    LEFT JOIN bills b ON rb.bill_id = b.bill_id
"#;

pub struct RegistrationRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> RegistrationRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pending registration; returns the generated id.
    ///
    /// An unknown patient or doctor id surfaces as a conflict from the
    /// foreign keys, not a pre-check.
    pub async fn create(
        &self,
        patient_id: i64,
        doctor_id: i64,
        date: NaiveDate,
        notes: &str,
    ) -> DbResult<i64> {
        let row = sqlx::query(
            r#"
            INSERT INTO registrations (registration_date, patient_id, doctor_id, notes)
            VALUES (?, ?, ?, ?)
            RETURNING registration_id
            "#,
        )
        .bind(date)
        .bind(patient_id)
        .bind(doctor_id)
        .bind(notes)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if is_fk_violation(&e) {
                DbError::conflict(format!(
                    "patient {patient_id} or doctor {doctor_id} does not exist"
                ))
            } else {
                e.into()
            }
        })?;

        Ok(row.try_get("registration_id")?)
    }

    pub async fn get(&self, registration_id: i64) -> DbResult<RegistrationView> {
        let query = format!("{REGISTRATION_VIEW} WHERE r.registration_id = ?");
        sqlx::query_as::<_, RegistrationView>(&query)
            .bind(registration_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("registration", registration_id))
    }

    pub async fn list_all(&self) -> DbResult<Vec<RegistrationView>> {
        let query = format!("{REGISTRATION_VIEW} ORDER BY r.registration_date DESC");
        Ok(sqlx::query_as::<_, RegistrationView>(&query)
            .fetch_all(self.pool)
            .await?)
    }

    pub async fn list_by_patient(&self, patient_id: i64) -> DbResult<Vec<RegistrationView>> {
        let query =
            format!("{REGISTRATION_VIEW} WHERE r.patient_id = ? ORDER BY r.registration_date DESC");
        Ok(sqlx::query_as::<_, RegistrationView>(&query)
            .bind(patient_id)
            .fetch_all(self.pool)
            .await?)
    }

    pub async fn list_by_doctor(&self, doctor_id: i64) -> DbResult<Vec<RegistrationView>> {
        let query =
            format!("{REGISTRATION_VIEW} WHERE r.doctor_id = ? ORDER BY r.registration_date DESC");
        Ok(sqlx::query_as::<_, RegistrationView>(&query)
            .bind(doctor_id)
            .fetch_all(self.pool)
            .await?)
    }

    /// Cancel a pending registration. Completed and cancelled are terminal;
    /// attempting to cancel one is a conflict, so no bill can ever belong
    /// to a cancelled registration.
    pub async fn cancel(&self, registration_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET status = 'cancelled'
            WHERE registration_id = ? AND status = 'pending'
            "#,
        )
        .bind(registration_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let status: Option<(String,)> =
                sqlx::query_as("SELECT status FROM registrations WHERE registration_id = ?")
                    .bind(registration_id)
                    .fetch_optional(self.pool)
                    .await?;
            return match status {
                None => Err(DbError::not_found("registration", registration_id)),
                Some((status,)) => Err(DbError::conflict(format!(
                    "registration {registration_id} is {status}, only pending registrations can be cancelled"
                ))),
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RegistrationStatus;
    use crate::repos::testutil;

    #[tokio::test]
    async fn create_and_read_back_view() {
        let store = testutil::seeded_store().await;
        let repo = RegistrationRepo::new(store.pool());

        let patient_id = testutil::create_patient(&store, "alice").await;
        let doctor_id = testutil::create_doctor(&store, "dr-chen", None).await;

        let reg_id = repo
            .create(patient_id, doctor_id, testutil::date("2026-03-14"), "first visit")
            .await
            .unwrap();

        let view = repo.get(reg_id).await.unwrap();
        assert_eq!(view.status, RegistrationStatus::Pending);
        assert_eq!(view.patient_name, "Patient alice");
        assert_eq!(view.doctor_name, "Dr. dr-chen");
        assert_eq!(view.notes, "first visit");
        assert!(!view.has_bill);
        assert_eq!(view.bill_amount, 0.0);
        assert!(view.bill_status.is_none());
    }

    #[tokio::test]
    async fn unknown_patient_or_doctor_is_conflict() {
        let store = testutil::seeded_store().await;
        let repo = RegistrationRepo::new(store.pool());
        let patient_id = testutil::create_patient(&store, "alice").await;

        let err = repo
            .create(patient_id, 999, testutil::date("2026-03-14"), "")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let err = repo
            .create(999, patient_id, testutil::date("2026-03-14"), "")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));
    }

    #[tokio::test]
    async fn listings_are_most_recent_first() {
        let store = testutil::seeded_store().await;
        let repo = RegistrationRepo::new(store.pool());

        let patient_id = testutil::create_patient(&store, "alice").await;
        let doctor_id = testutil::create_doctor(&store, "dr-chen", None).await;

        repo.create(patient_id, doctor_id, testutil::date("2026-03-01"), "")
            .await
            .unwrap();
        repo.create(patient_id, doctor_id, testutil::date("2026-03-20"), "")
            .await
            .unwrap();
        repo.create(patient_id, doctor_id, testutil::date("2026-03-10"), "")
            .await
            .unwrap();

        let all = repo.list_all().await.unwrap();
        let dates: Vec<_> = all.iter().map(|r| r.registration_date).collect();
        assert_eq!(
            dates,
            vec![
                testutil::date("2026-03-20"),
                testutil::date("2026-03-10"),
                testutil::date("2026-03-01"),
            ]
        );

        assert_eq!(repo.list_by_patient(patient_id).await.unwrap().len(), 3);
        assert_eq!(repo.list_by_doctor(doctor_id).await.unwrap().len(), 3);
        assert!(repo.list_by_patient(doctor_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_is_pending_only() {
        let store = testutil::seeded_store().await;
        let repo = RegistrationRepo::new(store.pool());

        let patient_id = testutil::create_patient(&store, "alice").await;
        let doctor_id = testutil::create_doctor(&store, "dr-chen", None).await;
        let reg_id = repo
            .create(patient_id, doctor_id, testutil::date("2026-03-14"), "")
            .await
            .unwrap();

        repo.cancel(reg_id).await.unwrap();
        assert_eq!(
            repo.get(reg_id).await.unwrap().status,
            RegistrationStatus::Cancelled
        );

        // Cancelled is terminal.
        let err = repo.cancel(reg_id).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let err = repo.cancel(999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
