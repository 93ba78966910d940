pub mod registration;
pub mod sectors;

pub use registration::{PaymentStatus, RegistrationRow};
pub use sectors::{Sector, SECTORS};
