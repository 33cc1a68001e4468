pub mod access;
pub mod auth_service;
pub mod catalog;
pub mod ledger;
pub mod password;
pub mod pricing;
