pub mod daily_summary;
pub mod readings;
