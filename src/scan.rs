//! Run driver: validates roots and summarizes every candidate folder under them.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::context::ScanContext;
use crate::folder::{FolderSummary, SubdirOptions, iter_subdirs, summarize_folder};
use crate::output::sort_summaries;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no valid input directories")]
    NoValidRoots,
}

/// Folder selection for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub subdirs: SubdirOptions,
    /// Drop summaries of folders without a PDF.
    pub only_with_pdfs: bool,
}

/// Hooks for progress display.
pub trait ScanObserver {
    /// Called before folder number `index` (1-based) is summarized.
    fn folder_started(&mut self, _index: usize, _folder: &Path) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ScanObserver for NoProgress {}

/// What a run produced, besides the state left in the context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Kept summaries, sorted by root then case-insensitive folder name.
    pub summaries: Vec<FolderSummary>,
    pub folders_failed: usize,
    /// Folders dropped by `only_with_pdfs`.
    pub folders_filtered: usize,
    /// The parse budget ran out before every folder was visited.
    pub stopped_by_limit: bool,
}

/// Keeps the candidate roots that exist and are directories.
///
/// Every rejected path is logged with `warn!`.
///
/// # Errors
///
/// Returns [`ScanError::NoValidRoots`] when nothing is left.
pub fn validate_roots(candidates: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let roots: Vec<PathBuf> = candidates
        .iter()
        .filter(|path| {
            if !path.exists() {
                warn!(path = %path.display(), "Input path does not exist");
                false
            } else if !path.is_dir() {
                warn!(path = %path.display(), "Input path is not a directory");
                false
            } else {
                true
            }
        })
        .cloned()
        .collect();

    if roots.is_empty() {
        return Err(ScanError::NoValidRoots);
    }
    Ok(roots)
}

/// Summarizes every candidate folder of every root, in order.
///
/// The budget is checked before each folder: once it is spent no further
/// folder is started, though the folder in progress finishes its walk and
/// records its remaining documents as skipped. A folder that fails is logged
/// and left out. Each kept summary also records its links entry.
pub fn run_scan(
    ctx: &mut ScanContext,
    roots: &[PathBuf],
    options: ScanOptions,
    observer: &mut dyn ScanObserver,
) -> ScanReport {
    let mut report = ScanReport::default();
    let mut started = 0;

    'roots: for root in roots {
        info!(root = %root.display(), "Scanning root");
        for (folder, _depth) in iter_subdirs(root, options.subdirs) {
            if ctx.budget.is_exhausted() {
                report.stopped_by_limit = true;
                break 'roots;
            }

            started += 1;
            observer.folder_started(started, &folder);

            let (summary, urls) = match summarize_folder(ctx, root, &folder) {
                Ok(found) => found,
                Err(e) => {
                    error!(folder = %folder.display(), error = %e, "Failed to summarize folder");
                    report.folders_failed += 1;
                    continue;
                }
            };
            if options.only_with_pdfs && summary.num_pdfs == 0 {
                report.folders_filtered += 1;
                continue;
            }

            ctx.record_folder_links(&summary, urls);
            report.summaries.push(summary);
        }
    }

    sort_summaries(&mut report.summaries);
    info!(
        folders = report.summaries.len(),
        failed = report.folders_failed,
        filtered = report.folders_filtered,
        documents_left = ctx.budget.remaining(),
        "Scan finished"
    );
    report
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;
    use crate::registry::ParseBudget;

    #[derive(Default)]
    struct Recorder(Vec<(usize, String)>);

    impl ScanObserver for Recorder {
        fn folder_started(&mut self, index: usize, folder: &Path) {
            let name = folder.file_name().unwrap().to_string_lossy().into_owned();
            self.0.push((index, name));
        }
    }

    fn paper_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (folder, file, body) in [
            ("alpha", "a.bib", "@article{a, title = {Alpha}}"),
            ("Beta", "b.ris", "TI  - Beta"),
            ("gamma", "notes.txt", "10.1234/gamma"),
        ] {
            fs::create_dir(dir.path().join(folder)).unwrap();
            fs::write(dir.path().join(folder).join(file), body).unwrap();
        }
        dir
    }

    #[test]
    fn test_validate_roots_filters_invalid_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let roots = validate_roots(&[dir.path().join("missing"), file, dir.path().to_path_buf()]).unwrap();
        assert_eq!(roots, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_validate_roots_none_valid() {
        let err = validate_roots(&[PathBuf::from("/no/such/dir")]).unwrap_err();
        assert!(matches!(err, ScanError::NoValidRoots));
    }

    #[test]
    fn test_run_scan_sorted_with_observer_counts() {
        let dir = paper_tree();
        let mut ctx = ScanContext::new(ParseBudget::new(10, false));
        let mut recorder = Recorder::default();
        let report = run_scan(&mut ctx, &[dir.path().to_path_buf()], ScanOptions::default(), &mut recorder);

        let names: Vec<_> = report.summaries.iter().map(|s| s.folder_name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "Beta", "gamma"]);
        assert_eq!(recorder.0.len(), 3);
        assert_eq!(recorder.0[0].0, 1);
        assert!(!report.stopped_by_limit);
        assert_eq!(ctx.budget.remaining(), 7);
        assert_eq!(ctx.folder_links.len(), 3);
        let gamma = ctx
            .folder_links
            .values()
            .find(|links| links.folder == "gamma")
            .unwrap();
        assert_eq!(gamma.urls, vec!["https://doi.org/10.1234/gamma"]);
    }

    #[test]
    fn test_run_scan_stops_starting_folders_when_budget_spent() {
        let dir = paper_tree();
        let mut ctx = ScanContext::new(ParseBudget::new(1, false));
        let report = run_scan(&mut ctx, &[dir.path().to_path_buf()], ScanOptions::default(), &mut NoProgress);
        assert_eq!(report.summaries.len(), 1);
        assert!(report.stopped_by_limit);
        assert_eq!(ctx.budget.remaining(), 0);
    }

    #[test]
    fn test_run_scan_zero_budget_visits_nothing() {
        let dir = paper_tree();
        let mut ctx = ScanContext::new(ParseBudget::new(0, false));
        let report = run_scan(&mut ctx, &[dir.path().to_path_buf()], ScanOptions::default(), &mut NoProgress);
        assert!(report.summaries.is_empty());
        assert!(ctx.registry.is_empty());
    }

    #[test]
    fn test_run_scan_only_with_pdfs() {
        let dir = paper_tree();
        fs::write(dir.path().join("Beta").join("paper.pdf"), "%PDF").unwrap();
        let mut ctx = ScanContext::new(ParseBudget::new(10, false));
        let options = ScanOptions {
            only_with_pdfs: true,
            ..ScanOptions::default()
        };
        let report = run_scan(&mut ctx, &[dir.path().to_path_buf()], options, &mut NoProgress);
        assert_eq!(report.summaries.len(), 1);
        assert_eq!(report.summaries[0].folder_name, "Beta");
        assert_eq!(report.folders_filtered, 2);
        assert_eq!(ctx.folder_links.len(), 1);
    }
}
