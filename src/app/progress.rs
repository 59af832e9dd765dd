//! Progress UI (spinner) for scan runs.

use std::path::Path;
use std::time::Duration;

use collect_papers_core::ScanObserver;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner on stderr naming the folder being summarized.
pub(crate) struct ScanSpinner {
    spinner: ProgressBar,
}

impl ScanSpinner {
    pub(crate) fn start() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    pub(crate) fn finish(self) {
        self.spinner.finish_and_clear();
    }
}

impl ScanObserver for ScanSpinner {
    fn folder_started(&mut self, index: usize, folder: &Path) {
        self.spinner.set_message(scanning_message(index, folder));
    }
}

pub(crate) fn scanning_message(index: usize, folder: &Path) -> String {
    let name = folder
        .file_name()
        .map_or_else(|| folder.display().to_string(), |n| n.to_string_lossy().into_owned());
    format!("[{index}] Scanning {name}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanning_message_uses_folder_name() {
        assert_eq!(
            scanning_message(3, Path::new("/papers/smith2020")),
            "[3] Scanning smith2020..."
        );
    }

    #[test]
    fn test_scanning_message_falls_back_to_full_path() {
        assert_eq!(scanning_message(1, Path::new("/")), "[1] Scanning /...");
    }

    #[test]
    fn test_spinner_observer_start_and_finish() {
        let mut spinner = ScanSpinner::start();
        spinner.folder_started(1, Path::new("/papers/a"));
        spinner.finish();
    }
}
