pub mod daily_records;
pub mod testing_points;
