//! Report module - summarizing search results

pub mod search_report;

pub use search_report::*;
