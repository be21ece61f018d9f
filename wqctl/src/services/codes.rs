//! Human-readable record codes (`PM001`, `ANL042`, `CL73519`).
//!
//! Testing-point and quality-test codes are sequential within their prefix. The next number
//! comes from the lexicographically greatest existing code with that prefix, so `PM010` beats
//! `PM002` but `PM999` also beats `PM1000`. That scan is then pushed through an atomic per-prefix
//! counter in the record store, which keeps concurrent creators from minting the same code and
//! keeps numbers moving forward after a hard delete.
//!
//! Daily-record codes are not sequential: they carry the current epoch milliseconds modulo
//! 100000.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::db::errors::Result;
use crate::db::models::{quality_tests::QualityTest, testing_points::PointType, testing_points::TestingPoint};
use crate::db::store::SEQUENCE_MAX;
use crate::db::{Record, Records, RecordStore};

pub const QUALITY_TEST_PREFIX: &str = "ANL";

/// Prefix for a testing point code, by point type.
pub fn point_code_prefix(point_type: Option<&PointType>) -> &'static str {
    match point_type {
        Some(PointType::Reservoir) => "PR",
        Some(PointType::DistributionNetwork) => "PD",
        Some(PointType::Household) => "PM",
        Some(PointType::Other(_)) | None => "PT",
    }
}

/// Prefix for a daily record code, by record type (case-insensitive).
pub fn daily_record_prefix(record_type: Option<&str>) -> &'static str {
    match record_type.map(|t| t.trim().to_uppercase()).as_deref() {
        Some("CLORO") => "CL",
        Some("SULFATO") => "SU",
        _ => "RC",
    }
}

/// Time-based daily record code: prefix followed by `now` epoch millis mod 100000, unpadded.
pub fn daily_record_code(record_type: Option<&str>, now: DateTime<Utc>) -> String {
    let suffix = now.timestamp_millis().rem_euclid(100_000);
    format!("{}{}", daily_record_prefix(record_type), suffix)
}

pub fn format_code(prefix: &str, number: u32) -> String {
    format!("{prefix}{number:03}")
}

/// Number carried by the greatest code (string order) starting with `prefix`.
///
/// Returns 0 when no code has the prefix or the greatest one has a suffix that is not a
/// non-negative 32-bit integer below [`SEQUENCE_MAX`], so the next code starts again at 1.
pub fn last_number<'a>(codes: impl IntoIterator<Item = &'a str>, prefix: &str) -> u32 {
    codes
        .into_iter()
        .filter(|code| code.starts_with(prefix))
        .max()
        .and_then(|code| code[prefix.len()..].parse::<i32>().ok())
        .and_then(|number| u32::try_from(number).ok())
        .filter(|number| *number < SEQUENCE_MAX)
        .unwrap_or(0)
}

/// The code following the existing ones, without reserving it.
pub fn next_code<'a>(codes: impl IntoIterator<Item = &'a str>, prefix: &str) -> String {
    format_code(prefix, last_number(codes, prefix).saturating_add(1))
}

/// Mints sequential codes against a record store.
#[derive(Clone)]
pub struct CodeGenerator {
    store: Arc<dyn RecordStore>,
}

impl CodeGenerator {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn next_point_code(&self, point_type: Option<&PointType>) -> Result<String> {
        self.next_in_sequence::<TestingPoint>(point_code_prefix(point_type), |p| p.point_code.as_str())
            .await
    }

    pub async fn next_test_code(&self) -> Result<String> {
        self.next_in_sequence::<QualityTest>(QUALITY_TEST_PREFIX, |t| t.test_code.as_str())
            .await
    }

    #[instrument(skip(self, code_of), fields(kind = %T::KIND), err)]
    async fn next_in_sequence<T: Record>(&self, prefix: &str, code_of: fn(&T) -> &str) -> Result<String> {
        let existing = Records::<T>::new(self.store.clone()).find_all().await?;
        let floor = last_number(existing.iter().map(code_of), prefix);

        let sequence = format!("{}:{}", T::KIND, prefix);
        let number = self.store.advance_sequence(&sequence, floor).await?;
        let code = format_code(prefix, number);

        debug!(floor, %code, "Generated code");
        Ok(code)
    }
}
