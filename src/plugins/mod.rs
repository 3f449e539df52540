//! Entity repositories. Each module owns one collection of the document (KYC
//! review works on users) and exposes its clap surface plus plain functions
//! taking a [`Store`](crate::core::store::Store).

pub mod accounts;
pub mod bots;
pub mod careers;
pub mod catalog;
pub mod kyc;
pub mod users;
