//! Stored record types.
//!
//! These are the shapes persisted in the record store. API request/response types live in
//! [`crate::api::models`] and convert from these.

pub mod daily_records;
pub mod quality_tests;
pub mod testing_points;
