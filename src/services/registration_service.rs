use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::registration_repo::{self, NewRegistration};
use crate::models::registration::REGISTRATION_FEE_INR;
use crate::models::{PaymentStatus, RegistrationRow};

/// Raw form/JSON fields as submitted by the client.
#[derive(Debug, Default)]
pub struct RegistrationInput {
    pub name: String,
    pub age: String,
    pub unit: String,
    pub sector: String,
    pub phone_number: String,
}

/// Fields after trimming and type checks.
#[derive(Debug, PartialEq)]
pub struct ValidRegistration {
    pub name: String,
    pub age: i64,
    pub unit: String,
    pub sector: String,
    pub phone_number: String,
}

pub fn validate_registration(input: &RegistrationInput) -> Result<ValidRegistration, String> {
    let name = input.name.trim();
    let age = input.age.trim();
    let unit = input.unit.trim();
    let sector = input.sector.trim();
    let phone = input.phone_number.trim();

    if name.is_empty() || age.is_empty() || unit.is_empty() || sector.is_empty() || phone.is_empty()
    {
        return Err("All fields are required".to_string());
    }

    let age: i64 = age
        .parse()
        .map_err(|_| "Age must be a number".to_string())?;
    if age < 1 {
        return Err("Age must be a positive number".to_string());
    }

    if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err("Phone number must be 10 digits".to_string());
    }

    Ok(ValidRegistration {
        name: name.to_string(),
        age,
        unit: unit.to_string(),
        sector: sector.to_string(),
        phone_number: phone.to_string(),
    })
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persist a checkout-flow registration. The payment is already captured by
/// the gateway at this point, so the record starts out `completed`.
pub async fn create_completed_registration(
    pool: &SqlitePool,
    form: &ValidRegistration,
    payment_id: &str,
    order_id: &str,
) -> sqlx::Result<String> {
    let id = Uuid::new_v4().to_string();
    registration_repo::insert_registration(
        pool,
        NewRegistration {
            id: &id,
            name: &form.name,
            age: form.age,
            unit: &form.unit,
            sector: &form.sector,
            phone_number: &form.phone_number,
            amount: REGISTRATION_FEE_INR,
            payment_status: PaymentStatus::Completed.as_str(),
            payment_id: Some(payment_id),
            order_id: Some(order_id),
            transaction_id: None,
            screenshot_ref: None,
            registered_at: &now_rfc3339(),
        },
    )
    .await?;
    Ok(id)
}

/// Persist a screenshot-flow registration, awaiting admin review.
pub async fn create_pending_registration(
    pool: &SqlitePool,
    form: &ValidRegistration,
    screenshot_ref: &str,
    transaction_id: Option<&str>,
) -> sqlx::Result<String> {
    let id = Uuid::new_v4().to_string();
    registration_repo::insert_registration(
        pool,
        NewRegistration {
            id: &id,
            name: &form.name,
            age: form.age,
            unit: &form.unit,
            sector: &form.sector,
            phone_number: &form.phone_number,
            amount: REGISTRATION_FEE_INR,
            payment_status: PaymentStatus::Pending.as_str(),
            payment_id: None,
            order_id: None,
            transaction_id,
            screenshot_ref: Some(screenshot_ref),
            registered_at: &now_rfc3339(),
        },
    )
    .await?;
    Ok(id)
}

#[derive(Debug)]
pub enum VerifyError {
    NotFound,
    AlreadyDecided,
    Db(sqlx::Error),
}

impl From<sqlx::Error> for VerifyError {
    fn from(e: sqlx::Error) -> Self {
        VerifyError::Db(e)
    }
}

/// Apply an admin decision to a pending registration and return the updated
/// row. Only `pending` rows can be decided, and only once.
pub async fn verify_registration(
    pool: &SqlitePool,
    id: &str,
    decision: PaymentStatus,
    admin_name: &str,
    transaction_id: Option<&str>,
) -> Result<RegistrationRow, VerifyError> {
    let Some(row) = registration_repo::find_registration(pool, id).await? else {
        return Err(VerifyError::NotFound);
    };
    if row.payment_status != PaymentStatus::Pending.as_str() {
        return Err(VerifyError::AlreadyDecided);
    }

    let n = registration_repo::update_verification(
        pool,
        id,
        decision.as_str(),
        admin_name,
        &now_rfc3339(),
        transaction_id,
    )
    .await?;
    if n == 0 {
        // Lost a race against another admin decision.
        return Err(VerifyError::AlreadyDecided);
    }

    registration_repo::find_registration(pool, id)
        .await?
        .ok_or(VerifyError::NotFound)
}

/// JSON shape of a registration as served by `/api/registrations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationView {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub unit: String,
    pub sector: String,
    pub phone_number: String,
    pub amount: i64,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(rename = "paymentScreenshot", skip_serializing_if = "Option::is_none")]
    pub screenshot_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
    pub registered_at: String,
}

impl From<RegistrationRow> for RegistrationView {
    fn from(row: RegistrationRow) -> Self {
        RegistrationView {
            id: row.id,
            name: row.name,
            age: row.age,
            unit: row.unit,
            sector: row.sector,
            phone_number: row.phone_number,
            amount: row.amount,
            payment_status: row.payment_status,
            payment_id: row.payment_id,
            order_id: row.order_id,
            transaction_id: row.transaction_id,
            screenshot_ref: row.screenshot_ref,
            verified_by: row.verified_by,
            verified_at: row.verified_at,
            registered_at: row.registered_at,
        }
    }
}

pub async fn list_registration_views(pool: &SqlitePool) -> sqlx::Result<Vec<RegistrationView>> {
    let rows = registration_repo::list_registrations(pool).await?;
    Ok(rows.into_iter().map(RegistrationView::from).collect())
}

/// Dashboard row, with options flattened into display-ready strings.
pub struct DashboardRow {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub unit: String,
    pub sector: String,
    pub phone_number: String,
    pub status: String,
    pub reference: String,
    pub has_screenshot: bool,
    pub screenshot_ref: String,
    pub verified_label: String,
    pub registered_at: String,
    pub is_pending: bool,
}

impl From<&RegistrationRow> for DashboardRow {
    fn from(row: &RegistrationRow) -> Self {
        let reference = row
            .payment_id
            .clone()
            .or_else(|| row.transaction_id.clone())
            .unwrap_or_else(|| "-".to_string());
        let verified_label = match (&row.verified_by, &row.verified_at) {
            (Some(by), Some(at)) => format!("{} at {}", by, at),
            _ => String::new(),
        };
        DashboardRow {
            id: row.id.clone(),
            name: row.name.clone(),
            age: row.age,
            unit: row.unit.clone(),
            sector: row.sector.clone(),
            phone_number: row.phone_number.clone(),
            status: row.payment_status.clone(),
            reference,
            has_screenshot: row.screenshot_ref.is_some(),
            screenshot_ref: row.screenshot_ref.clone().unwrap_or_default(),
            verified_label,
            registered_at: row.registered_at.clone(),
            is_pending: row.payment_status == PaymentStatus::Pending.as_str(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total_amount: i64,
}

pub fn compute_stats(rows: &[RegistrationRow]) -> DashboardStats {
    let mut pending = 0;
    let mut approved = 0;
    let mut rejected = 0;
    for row in rows {
        match row.payment_status.parse::<PaymentStatus>() {
            Ok(status) if status.is_approved() => approved += 1,
            Ok(PaymentStatus::Pending) => pending += 1,
            Ok(PaymentStatus::Rejected) => rejected += 1,
            _ => {}
        }
    }
    DashboardStats {
        total: rows.len() as i64,
        pending,
        approved,
        rejected,
        total_amount: REGISTRATION_FEE_INR * approved,
    }
}
