pub mod registration_repo;
