// cbm/src/ui.rs
//! Terminal progress helpers.
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "{spinner:.blue.bold} {msg}";
const BAR_TEMPLATE: &str = "{spinner:.blue.bold} {msg} [{bar:40.cyan/blue}] {pos:>3}%";

pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Spinner that turns into a percentage bar on the first progress report.
/// Downloads without a declared size never report, so they keep spinning.
pub fn download_progress(message: &str) -> (ProgressBar, impl FnMut(f64) + Send) {
    let pb = create_spinner(message);
    let handle = pb.clone();
    let mut is_bar = false;
    let on_progress = move |percent: f64| {
        if !is_bar {
            handle.set_length(100);
            if let Ok(style) = ProgressStyle::with_template(BAR_TEMPLATE) {
                handle.set_style(style.progress_chars("=> "));
            }
            is_bar = true;
        }
        handle.set_position(percent.round() as u64);
    };
    (pb, on_progress)
}
