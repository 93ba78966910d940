pub mod payment_service;
pub mod registration_service;
pub mod storage_service;
