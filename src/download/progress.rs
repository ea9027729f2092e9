use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Byte-level progress bar for a single file download.
pub struct DownloadProgress {
    bar: ProgressBar,
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
                     {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        DownloadProgress { bar }
    }

    pub fn set_total(&mut self, total: u64) {
        self.bar.set_length(total);
    }

    pub fn set_current(&mut self, current: u64) {
        self.bar.set_position(current);
    }

    pub fn set_message(&mut self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn finish(&mut self) {
        self.bar.finish_with_message("Complete");
    }
}
