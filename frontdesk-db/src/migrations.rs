//! Schema migrations and seed data
//!
//! `run` applies `CREATE TABLE IF NOT EXISTS` statements in dependency
//! order and fails fast on the first error; already-applied statements are
//! not rolled back (repeated restarts converge the schema). `seed` inserts
//! the default departments and the admin account, ignoring duplicates, so
//! both are safe to call on every startup.
//!
//! Uniqueness (usernames, department names, one bill per registration) is
//! enforced here by constraints; the domain layer catches violations
//! instead of pre-checking.

use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};

/// Run all schema migrations.
pub async fn run(pool: &SqlitePool) -> DbResult<()> {
    tracing::info!("running frontdesk migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('patient', 'doctor', 'admin')),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            department_id INTEGER PRIMARY KEY AUTOINCREMENT,
            department_name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            contact_phone TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS patients (
            patient_id INTEGER PRIMARY KEY
                REFERENCES users(user_id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            gender TEXT NOT NULL DEFAULT 'male'
                CHECK (gender IN ('male', 'female', 'other')),
            age INTEGER NOT NULL DEFAULT 0,
            address TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            id_card TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Department display names are derived by join; only the id is stored.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS doctors (
            doctor_id INTEGER PRIMARY KEY
                REFERENCES users(user_id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            gender TEXT NOT NULL DEFAULT 'male'
                CHECK (gender IN ('male', 'female', 'other')),
            age INTEGER NOT NULL DEFAULT 0,
            phone TEXT NOT NULL DEFAULT '',
            department_id INTEGER
                REFERENCES departments(department_id) ON DELETE SET NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS registrations (
            registration_id INTEGER PRIMARY KEY AUTOINCREMENT,
            registration_date TEXT NOT NULL,
            patient_id INTEGER NOT NULL REFERENCES patients(patient_id),
            doctor_id INTEGER NOT NULL REFERENCES doctors(doctor_id),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'completed', 'cancelled')),
            notes TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bills (
            bill_id INTEGER PRIMARY KEY AUTOINCREMENT,
            bill_date TEXT NOT NULL,
            amount REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'unpaid'
                CHECK (status IN ('unpaid', 'paid')),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Registration id is the primary key and bill id is unique: at most
    // one bill per registration, one registration per bill.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS registration_bills (
            registration_id INTEGER PRIMARY KEY
                REFERENCES registrations(registration_id),
            bill_id INTEGER NOT NULL UNIQUE
                REFERENCES bills(bill_id),
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS operation_logs (
            log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            operation_type TEXT NOT NULL,
            target_id INTEGER,
            details TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    create_indexes(pool).await?;

    tracing::info!("frontdesk migrations complete");
    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_registrations_patient ON registrations(patient_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_registrations_doctor ON registrations(doctor_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_registrations_date ON registrations(registration_date DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_doctors_department ON doctors(department_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Fixed list of default departments seeded on first start.
const DEFAULT_DEPARTMENTS: &[(&str, &str, &str, &str)] = &[
    (
        "Internal Medicine",
        "General internal conditions such as colds, hypertension and diabetes",
        "010-12345671",
        "Outpatient building, floor 2, rooms 201-210",
    ),
    (
        "Surgery",
        "Operative care including general surgery, orthopedics and neurosurgery",
        "010-12345672",
        "Outpatient building, floor 3, rooms 301-315",
    ),
    (
        "Pediatrics",
        "Care for children aged 0-14",
        "010-12345673",
        "Outpatient building, floor 1, rooms 101-110",
    ),
    (
        "Obstetrics and Gynecology",
        "Gynecology, obstetrics and women's health",
        "010-12345674",
        "Outpatient building, floor 4, rooms 401-410",
    ),
    (
        "Ophthalmology",
        "Eye conditions and vision checks",
        "010-12345675",
        "Outpatient building, floor 5, rooms 501-505",
    ),
    (
        "Dentistry",
        "Dental and oral care",
        "010-12345676",
        "Outpatient building, floor 6, rooms 601-605",
    ),
    (
        "Otolaryngology",
        "Ear, nose and throat conditions",
        "010-12345677",
        "Outpatient building, floor 3, rooms 316-320",
    ),
    (
        "Dermatology",
        "Skin conditions",
        "010-12345678",
        "Outpatient building, floor 2, rooms 211-215",
    ),
    (
        "Traditional Medicine",
        "Traditional medicine services",
        "010-12345679",
        "Outpatient building, floor 1, rooms 111-115",
    ),
    (
        "Rehabilitation",
        "Post-operative recovery and physical therapy",
        "010-12345680",
        "Rehabilitation center, floor 1",
    ),
    (
        "Emergency",
        "24-hour emergency services",
        "010-12345681",
        "Emergency building, floor 1",
    ),
];

/// Seed default departments and the admin account. Idempotent: existing
/// rows are left untouched.
pub async fn seed(pool: &SqlitePool, admin_username: &str, admin_password: &str) -> DbResult<()> {
    for (name, description, phone, location) in DEFAULT_DEPARTMENTS {
        sqlx::query(
            r#"
            INSERT INTO departments (department_name, description, contact_phone, location)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (department_name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(phone)
        .bind(location)
        .execute(pool)
        .await?;
    }

    // Hash in-process; the plaintext never reaches the store.
    let password_hash = frontdesk_core::password::hash(admin_password)
        .map_err(|e| DbError::Password(e.to_string()))?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role)
        VALUES (?, ?, 'admin')
        ON CONFLICT (username) DO NOTHING
        "#,
    )
    .bind(admin_username)
    .bind(&password_hash)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(username = admin_username, "seeded admin account");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();
        seed(store.pool(), "admin", "admin123").await.unwrap();
        seed(store.pool(), "admin", "admin123").await.unwrap();

        let (dept_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM departments")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(dept_count, 11);

        let (admin_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = 'admin'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(admin_count, 1);
    }

    #[tokio::test]
    async fn seed_does_not_overwrite_existing_admin() {
        let store = Store::open_in_memory().await.unwrap();
        seed(store.pool(), "admin", "first-password").await.unwrap();

        let (hash_before,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = 'admin'")
                .fetch_one(store.pool())
                .await
                .unwrap();

        seed(store.pool(), "admin", "second-password").await.unwrap();

        let (hash_after,): (String,) =
            sqlx::query_as("SELECT password_hash FROM users WHERE username = 'admin'")
                .fetch_one(store.pool())
                .await
                .unwrap();
        assert_eq!(hash_before, hash_after);
    }
}
