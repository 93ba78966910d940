use std::str::FromStr;

/// Fixed registration fee in INR.
pub const REGISTRATION_FEE_INR: i64 = 30;

/// Smallest-currency-unit amount the gateway expects (paise).
pub const REGISTRATION_FEE_SUBUNITS: i64 = REGISTRATION_FEE_INR * 100;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationRow {
    pub id: String,
    pub name: String,
    pub age: i64,
    pub unit: String,
    pub sector: String,
    pub phone_number: String,
    pub amount: i64,
    pub payment_status: String,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub transaction_id: Option<String>,
    pub screenshot_ref: Option<String>,
    pub verified_by: Option<String>,
    pub verified_at: Option<String>,
    pub registered_at: String,
}

/// Wire status of a registration's payment. The checkout flow writes
/// `completed`/`failed`, the screenshot flow writes `pending` and the admin
/// moves it to `verified` or `rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Verified => "verified",
            PaymentStatus::Rejected => "rejected",
        }
    }

    /// Statuses that count as a collected fee.
    pub fn is_approved(&self) -> bool {
        matches!(self, PaymentStatus::Completed | PaymentStatus::Verified)
    }
}

impl FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            "verified" => Ok(PaymentStatus::Verified),
            "rejected" => Ok(PaymentStatus::Rejected),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_wire_strings() {
        for s in ["pending", "completed", "failed", "verified", "rejected"] {
            let parsed: PaymentStatus = s.parse().expect("known status");
            assert_eq!(parsed.as_str(), s);
        }
        assert!("approved".parse::<PaymentStatus>().is_err());
        assert!("".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn only_completed_and_verified_count_as_approved() {
        assert!(PaymentStatus::Completed.is_approved());
        assert!(PaymentStatus::Verified.is_approved());
        assert!(!PaymentStatus::Pending.is_approved());
        assert!(!PaymentStatus::Failed.is_approved());
        assert!(!PaymentStatus::Rejected.is_approved());
    }
}
