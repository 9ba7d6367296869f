use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// A ticking spinner, or a hidden one when `quiet` is set.
pub(crate) fn spinner(quiet: bool, msg: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan} {msg}")
            .expect("static pattern")
            .tick_chars("/-\\|"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
