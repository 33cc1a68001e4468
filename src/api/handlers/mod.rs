pub mod auth;
pub mod booking;
pub mod health;
pub mod property;
