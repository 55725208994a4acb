//! Progress reporting for long-running fits
//!
//! The search shares one bar across all rayon workers; the unit of
//! progress is a completed fold fit, not a candidate, so the bar length
//! must match `GridSearch::planned_fits`.

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner for indeterminate work such as dataset loading.
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Bar counting individual fold fits across every candidate.
pub fn create_fit_bar(total_fits: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total_fits);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} fits ({per_sec}, eta {eta})")
            .unwrap()
            .progress_chars("█▓▒░"),
    );
    pb.set_message(message.to_string());
    pb
}

/// Finish a bar with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

/// Finish a bar with a warning message
pub fn finish_with_warning(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("⚠️  {}", message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_bar_length_matches_planned_fits() {
        let pb = create_fit_bar(20, "Evaluating candidates");
        assert_eq!(pb.length(), Some(20));
        pb.inc(7);
        assert_eq!(pb.position(), 7);
    }
}
