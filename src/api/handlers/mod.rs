/// Single-account reads and administration
pub mod account;
/// Chat and WhatsApp endpoints
pub mod chat;
/// Health, registration and login
pub mod general;
/// Deposits, transfers and history
pub mod transaction;
