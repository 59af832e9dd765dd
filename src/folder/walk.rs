//! Directory enumeration: candidate paper folders and the counting walk.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use crate::registry::DocumentKind;

/// Options for enumerating candidate folders under a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubdirOptions {
    /// How many levels below the root to yield; 1 means immediate children only.
    pub max_depth: usize,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
}

impl Default for SubdirOptions {
    fn default() -> Self {
        Self {
            max_depth: 1,
            include_hidden: false,
            follow_symlinks: false,
        }
    }
}

/// Yields `(folder, depth)` for every subdirectory of `root` down to `max_depth`.
///
/// Depth 0 is an immediate child of the root. Each folder is followed by its
/// own descendants (pre-order), siblings in file-name order. Hidden folders
/// are neither yielded nor descended into unless requested, and symlinked
/// folders only count when links are followed. Unreadable subtrees are skipped.
pub fn iter_subdirs(root: &Path, options: SubdirOptions) -> impl Iterator<Item = (PathBuf, usize)> {
    let include_hidden = options.include_hidden;
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(options.max_depth.max(1))
        .follow_links(options.follow_symlinks)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| entry.depth() == 0 || include_hidden || !is_hidden(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| {
            let depth = entry.depth() - 1;
            (entry.into_path(), depth)
        })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Non-directory entries under `folder`, symlinks not followed, in file-name order.
///
/// Symlinks to files and dangling symlinks count as files; symlinks to
/// directories count as directories but are not descended into.
pub(crate) fn walk_entries(folder: &Path) -> impl Iterator<Item = WalkEntry> {
    WalkDir::new(folder)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| {
            let is_dir = entry.file_type().is_dir()
                || (entry.path_is_symlink() && entry.path().is_dir());
            WalkEntry {
                path: entry.into_path(),
                is_dir,
            }
        })
}

pub(crate) struct WalkEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl WalkEntry {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Tallies gathered by the counting walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FolderTally {
    pub num_files_total: usize,
    pub num_dirs_total: usize,
    pub num_pdfs: usize,
    pub num_bibtex: usize,
    pub num_ris: usize,
    pub num_nbib: usize,
    pub num_json: usize,
    pub num_txt_md: usize,
    pub total_size_bytes: u64,
    pub earliest_mtime: Option<SystemTime>,
    pub latest_mtime: Option<SystemTime>,
    pub example_pdf: Option<PathBuf>,
    /// Every PDF counted, in walk order.
    pub pdfs: Vec<PathBuf>,
}

/// Counts files, subdirectories, sizes and mtimes under `folder`.
///
/// A file whose metadata cannot be read still counts toward
/// `num_files_total` but toward nothing else.
pub(crate) fn tally_folder(folder: &Path) -> FolderTally {
    let mut tally = FolderTally::default();

    for entry in walk_entries(folder) {
        if entry.is_dir {
            tally.num_dirs_total += 1;
            continue;
        }
        tally.num_files_total += 1;

        let Ok(metadata) = std::fs::metadata(&entry.path) else {
            continue;
        };
        tally.total_size_bytes += metadata.len();
        if let Ok(mtime) = metadata.modified() {
            tally.earliest_mtime = Some(tally.earliest_mtime.map_or(mtime, |t| t.min(mtime)));
            tally.latest_mtime = Some(tally.latest_mtime.map_or(mtime, |t| t.max(mtime)));
        }

        match DocumentKind::from_file_name(&entry.file_name()) {
            Some(DocumentKind::Pdf) => {
                tally.num_pdfs += 1;
                if tally.example_pdf.is_none() {
                    tally.example_pdf = Some(entry.path.clone());
                }
                tally.pdfs.push(entry.path);
            }
            Some(DocumentKind::Bib) => tally.num_bibtex += 1,
            Some(DocumentKind::Ris) => tally.num_ris += 1,
            Some(DocumentKind::Nbib) => tally.num_nbib += 1,
            Some(DocumentKind::Json) => tally.num_json += 1,
            Some(DocumentKind::TxtMd) => tally.num_txt_md += 1,
            Some(DocumentKind::Docx) | None => {}
        }
    }

    tally
}
