//! Progress bar over the discovered files.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} {msg:>10} [{bar:30.cyan/dim}] {pos}/{len}";

/// A bar that stays hidden until [`start`] knows how many files there are.
pub fn hidden() -> ProgressBar {
    ProgressBar::hidden()
}

/// Show the bar for `total` files.
pub fn start(bar: &ProgressBar, total: u64) {
    bar.set_length(total);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message("Importing");
    bar.set_draw_target(ProgressDrawTarget::stderr());
}
