pub mod appointment_service;
pub mod auth_service;
pub mod catalog_service;
pub mod comment_service;
