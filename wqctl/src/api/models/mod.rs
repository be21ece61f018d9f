//! Request and response types for the HTTP API.
//!
//! Everything here serializes as camelCase. Responses are wrapped in the [`envelope::ApiResponse`]
//! envelope by the handlers.

pub mod daily_records;
pub mod envelope;
pub mod quality_tests;
pub mod testing_points;
