//! Utility modules for progress display and terminal styling

pub mod progress;
pub mod styling;
