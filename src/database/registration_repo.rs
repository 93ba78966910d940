use sqlx::SqlitePool;

use crate::models::RegistrationRow;

const SQL_CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS registrations (
  id             TEXT PRIMARY KEY,
  name           TEXT NOT NULL,
  age            INTEGER NOT NULL,
  unit           TEXT NOT NULL,
  sector         TEXT NOT NULL,
  phone_number   TEXT NOT NULL,
  amount         INTEGER NOT NULL,
  payment_status TEXT NOT NULL,
  payment_id     TEXT,
  order_id       TEXT,
  transaction_id TEXT,
  screenshot_ref TEXT,
  verified_by    TEXT,
  verified_at    TEXT,
  registered_at  TEXT NOT NULL
)
"#;

pub async fn init_schema(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query(SQL_CREATE_TABLE).execute(pool).await?;
    Ok(())
}

/// Cheap connectivity probe, used for the 503 check before accepting an
/// upload.
pub async fn ping(pool: &SqlitePool) -> sqlx::Result<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

const SQL_INSERT_REGISTRATION: &str = r#"
INSERT INTO registrations (
  id,
  name,
  age,
  unit,
  sector,
  phone_number,
  amount,
  payment_status,
  payment_id,
  order_id,
  transaction_id,
  screenshot_ref,
  registered_at
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

pub struct NewRegistration<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub age: i64,
    pub unit: &'a str,
    pub sector: &'a str,
    pub phone_number: &'a str,
    pub amount: i64,
    pub payment_status: &'a str,
    pub payment_id: Option<&'a str>,
    pub order_id: Option<&'a str>,
    pub transaction_id: Option<&'a str>,
    pub screenshot_ref: Option<&'a str>,
    pub registered_at: &'a str,
}

pub async fn insert_registration(
    pool: &SqlitePool,
    new: NewRegistration<'_>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_INSERT_REGISTRATION)
        .bind(new.id)
        .bind(new.name)
        .bind(new.age)
        .bind(new.unit)
        .bind(new.sector)
        .bind(new.phone_number)
        .bind(new.amount)
        .bind(new.payment_status)
        .bind(new.payment_id)
        .bind(new.order_id)
        .bind(new.transaction_id)
        .bind(new.screenshot_ref)
        .bind(new.registered_at)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

// Newest first; id breaks timestamp ties so the order is total.
const SQL_LIST_REGISTRATIONS: &str = r#"
SELECT
  id,
  name,
  age,
  unit,
  sector,
  phone_number,
  amount,
  payment_status,
  payment_id,
  order_id,
  transaction_id,
  screenshot_ref,
  verified_by,
  verified_at,
  registered_at
FROM registrations
ORDER BY registered_at DESC, id DESC
"#;

pub async fn list_registrations(pool: &SqlitePool) -> sqlx::Result<Vec<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_LIST_REGISTRATIONS)
        .fetch_all(pool)
        .await
}

const SQL_FIND_REGISTRATION: &str = r#"
SELECT
  id,
  name,
  age,
  unit,
  sector,
  phone_number,
  amount,
  payment_status,
  payment_id,
  order_id,
  transaction_id,
  screenshot_ref,
  verified_by,
  verified_at,
  registered_at
FROM registrations
WHERE id = ?
"#;

pub async fn find_registration(
    pool: &SqlitePool,
    id: &str,
) -> sqlx::Result<Option<RegistrationRow>> {
    sqlx::query_as::<_, RegistrationRow>(SQL_FIND_REGISTRATION)
        .bind(id)
        .fetch_optional(pool)
        .await
}

// The pending guard makes the pending -> verified/rejected transition the
// only one the application can perform, even under concurrent admin clicks.
const SQL_UPDATE_VERIFICATION: &str = r#"
UPDATE registrations
SET payment_status = ?,
    verified_by = ?,
    verified_at = ?,
    transaction_id = COALESCE(?, transaction_id)
WHERE id = ? AND payment_status = 'pending'
"#;

pub async fn update_verification(
    pool: &SqlitePool,
    id: &str,
    status: &str,
    verified_by: &str,
    verified_at: &str,
    transaction_id: Option<&str>,
) -> sqlx::Result<u64> {
    let res = sqlx::query(SQL_UPDATE_VERIFICATION)
        .bind(status)
        .bind(verified_by)
        .bind(verified_at)
        .bind(transaction_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> SqlitePool {
        // Every pooled connection to :memory: would get its own database,
        // so pin the pool to one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        init_schema(&pool).await.expect("schema");
        pool
    }

    fn pending(id: &'static str, registered_at: &'static str) -> NewRegistration<'static> {
        NewRegistration {
            id,
            name: "Amina",
            age: 21,
            unit: "Adhur",
            sector: "Kasaragod East",
            phone_number: "9876543210",
            amount: 30,
            payment_status: "pending",
            payment_id: None,
            order_id: None,
            transaction_id: None,
            screenshot_ref: Some("/uploads/a.png"),
            registered_at,
        }
    }

    #[tokio::test]
    async fn list_is_sorted_newest_first() {
        let pool = memory_pool().await;
        insert_registration(&pool, pending("r1", "2026-01-01T10:00:00Z"))
            .await
            .unwrap();
        insert_registration(&pool, pending("r2", "2026-01-02T10:00:00Z"))
            .await
            .unwrap();
        insert_registration(&pool, pending("r3", "2026-01-01T09:00:00Z"))
            .await
            .unwrap();

        let rows = list_registrations(&pool).await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r1", "r3"]);
    }

    #[tokio::test]
    async fn verification_update_only_applies_to_pending_rows() {
        let pool = memory_pool().await;
        insert_registration(&pool, pending("r1", "2026-01-01T10:00:00Z"))
            .await
            .unwrap();

        let n = update_verification(&pool, "r1", "verified", "admin", "2026-01-03T08:00:00Z", None)
            .await
            .unwrap();
        assert_eq!(n, 1);

        let row = find_registration(&pool, "r1").await.unwrap().unwrap();
        assert_eq!(row.payment_status, "verified");
        assert_eq!(row.verified_by.as_deref(), Some("admin"));
        assert!(row.verified_at.is_some());

        // A second decision must not overwrite the first.
        let n = update_verification(&pool, "r1", "rejected", "admin", "2026-01-03T09:00:00Z", None)
            .await
            .unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn transaction_id_is_kept_when_decision_omits_it() {
        let pool = memory_pool().await;
        let mut new = pending("r1", "2026-01-01T10:00:00Z");
        new.transaction_id = Some("TXN123");
        insert_registration(&pool, new).await.unwrap();

        update_verification(&pool, "r1", "verified", "admin", "2026-01-03T08:00:00Z", None)
            .await
            .unwrap();
        let row = find_registration(&pool, "r1").await.unwrap().unwrap();
        assert_eq!(row.transaction_id.as_deref(), Some("TXN123"));
    }
}
