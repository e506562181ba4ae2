//! Billing repository
//!
//! Settlement is the only path from pending to completed. The bill row,
//! the registration link, and the status flip happen in one transaction,
//! so a registration can never end up completed without a bill or
//! billed twice.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::error::{is_fk_violation, is_unique_violation, DbError, DbResult};
use crate::models::Bill;
use crate::repos::audit;

pub struct BillingRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> BillingRepo<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Settle a pending registration: create a bill dated today (unpaid
    /// until payment is recorded), link it to the registration, and mark
    /// the registration completed. Returns the new bill id.
    pub async fn settle(&self, registration_id: i64, amount: f64) -> DbResult<i64> {
        if amount < 0.0 || !amount.is_finite() {
            return Err(DbError::InvalidInput(format!(
                "bill amount must be a non-negative number, got {amount}"
            )));
        }

        let mut tx = self.pool.begin().await?;

        // Status is left to the schema default ('unpaid'); payment is
        // recorded separately via `mark_paid`.
        let row = sqlx::query(
            r#"
            INSERT INTO bills (bill_date, amount)
            VALUES (?, ?)
            RETURNING bill_id
            "#,
        )
        .bind(Utc::now().date_naive())
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;
        let bill_id: i64 = row.try_get("bill_id")?;

        // The link table's primary key is the registration id, so a second
        // settlement attempt fails here and the bill above rolls back.
        sqlx::query("INSERT INTO registration_bills (registration_id, bill_id) VALUES (?, ?)")
            .bind(registration_id)
            .bind(bill_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    DbError::conflict(format!(
                        "registration {registration_id} already has a bill"
                    ))
                } else if is_fk_violation(&e) {
                    DbError::not_found("registration", registration_id)
                } else {
                    e.into()
                }
            })?;

        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET status = 'completed'
            WHERE registration_id = ? AND status = 'pending'
            "#,
        )
        .bind(registration_id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            // Not pending (cancelled, or completed without a link row should
            // be impossible). Dropping the transaction rolls everything back.
            return Err(DbError::conflict(format!(
                "registration {registration_id} is not pending"
            )));
        }

        tx.commit().await?;

        audit::log_operation(
            self.pool,
            "settle_bill",
            registration_id,
            &format!("bill {bill_id}, amount {amount:.2}"),
        )
        .await;

        Ok(bill_id)
    }

    /// Record payment of a bill. Paying twice is a conflict.
    pub async fn mark_paid(&self, bill_id: i64) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE bills SET status = 'paid' WHERE bill_id = ? AND status = 'unpaid'",
        )
        .bind(bill_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM bills WHERE bill_id = ?)")
                    .bind(bill_id)
                    .fetch_one(self.pool)
                    .await?;
            return if exists {
                Err(DbError::conflict(format!("bill {bill_id} is already paid")))
            } else {
                Err(DbError::not_found("bill", bill_id))
            };
        }
        Ok(())
    }

    pub async fn get_by_registration(&self, registration_id: i64) -> DbResult<Bill> {
        sqlx::query_as::<_, Bill>(
            r#"
            SELECT b.bill_id, b.bill_date, b.amount, b.status
            FROM registration_bills rb
            JOIN bills b ON rb.bill_id = b.bill_id
            WHERE rb.registration_id = ?
            "#,
        )
        .bind(registration_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("bill for registration", registration_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BillStatus, RegistrationStatus};
    use crate::repos::testutil;
    use crate::repos::RegistrationRepo;

    async fn pending_registration(store: &crate::store::Store) -> i64 {
        let patient_id = testutil::create_patient(store, "alice").await;
        let doctor_id = testutil::create_doctor(store, "dr-chen", None).await;
        RegistrationRepo::new(store.pool())
            .create(patient_id, doctor_id, testutil::date("2026-03-14"), "")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn settle_completes_registration_and_creates_unpaid_bill() {
        let store = testutil::seeded_store().await;
        let billing = BillingRepo::new(store.pool());
        let registrations = RegistrationRepo::new(store.pool());

        let reg_id = pending_registration(&store).await;
        let bill_id = billing.settle(reg_id, 150.5).await.unwrap();

        let bill = billing.get_by_registration(reg_id).await.unwrap();
        assert_eq!(bill.bill_id, bill_id);
        assert_eq!(bill.amount, 150.5);
        assert_eq!(bill.status, BillStatus::Unpaid);
        assert_eq!(bill.bill_date, Utc::now().date_naive());

        let view = registrations.get(reg_id).await.unwrap();
        assert_eq!(view.status, RegistrationStatus::Completed);
        assert!(view.has_bill);
        assert_eq!(view.bill_amount, 150.5);
        assert_eq!(view.bill_status, Some(BillStatus::Unpaid));
    }

    #[tokio::test]
    async fn mark_paid_flips_status_once() {
        let store = testutil::seeded_store().await;
        let billing = BillingRepo::new(store.pool());

        let reg_id = pending_registration(&store).await;
        let bill_id = billing.settle(reg_id, 150.5).await.unwrap();

        billing.mark_paid(bill_id).await.unwrap();
        let bill = billing.get_by_registration(reg_id).await.unwrap();
        assert_eq!(bill.status, BillStatus::Paid);

        let err = billing.mark_paid(bill_id).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let err = billing.mark_paid(999).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn double_settle_rolls_back_the_second_bill() {
        let store = testutil::seeded_store().await;
        let billing = BillingRepo::new(store.pool());

        let reg_id = pending_registration(&store).await;
        billing.settle(reg_id, 100.0).await.unwrap();

        let err = billing.settle(reg_id, 200.0).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        // The rejected attempt left no orphan bill behind.
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bills")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(billing.get_by_registration(reg_id).await.unwrap().amount, 100.0);
    }

    #[tokio::test]
    async fn settle_after_cancel_leaves_no_bill() {
        let store = testutil::seeded_store().await;
        let billing = BillingRepo::new(store.pool());
        let registrations = RegistrationRepo::new(store.pool());

        let reg_id = pending_registration(&store).await;
        registrations.cancel(reg_id).await.unwrap();

        let err = billing.settle(reg_id, 100.0).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bills")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(matches!(
            billing.get_by_registration(reg_id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn settle_unknown_registration_is_not_found() {
        let store = testutil::seeded_store().await;
        let billing = BillingRepo::new(store.pool());

        let err = billing.settle(999, 100.0).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn negative_amount_is_rejected() {
        let store = testutil::seeded_store().await;
        let billing = BillingRepo::new(store.pool());

        let reg_id = pending_registration(&store).await;
        let err = billing.settle(reg_id, -1.0).await.unwrap_err();
        assert!(matches!(err, DbError::InvalidInput(_)));
    }
}
