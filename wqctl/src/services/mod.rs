//! Business logic behind the HTTP handlers.
//!
//! - [`codes`]: record code generation
//! - [`enrichment`]: composing stored records with testing points and identity data
//! - [`testing_points`], [`quality_tests`], [`daily_records`]: per-kind lifecycle operations
//!
//! Every operation takes the caller's organization id; records of other organizations behave
//! as if they did not exist.

pub mod codes;
pub mod daily_records;
pub mod enrichment;
pub mod quality_tests;
pub mod testing_points;

pub use daily_records::DailyRecordService;
pub use quality_tests::QualityTestService;
pub use testing_points::TestingPointService;
