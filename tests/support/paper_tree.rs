//! Paper-folder fixture trees built in temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A library root with one folder per paper.
pub struct PaperTree {
    pub dir: TempDir,
}

impl PaperTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Creates `folder/name` with `body`, creating the folder as needed.
    pub fn file(&self, folder: &str, name: &str, body: &str) -> PathBuf {
        let folder_path = self.root().join(folder);
        fs::create_dir_all(&folder_path).expect("Failed to create paper folder");
        let path = folder_path.join(name);
        fs::write(&path, body).expect("Failed to write fixture file");
        path
    }

    /// Three papers: a complete BibTeX export with a PDF, a RIS export and a notes-only folder.
    pub fn library() -> Self {
        let tree = Self::new();
        tree.file(
            "smith2020",
            "smith2020.bib",
            "@article{smith2020,\n  title = {Root Growth in Arabidopsis},\n  author = {Smith, J. and Doe, A.},\n  year = {2020},\n  journal = {Plant Cell},\n  doi = {10.1105/tpc.20.00001},\n  url = {https://plantcell.org/smith2020}\n}\nSee also 10.1038/s41586-019-1234-5\n",
        );
        tree.file(
            "smith2020",
            "smith2020.pdf",
            "%PDF-1.4 /URI (https://pubmed.ncbi.nlm.nih.gov/31452104/)",
        );
        tree.file(
            "Lee_2018",
            "citation.ris",
            "TY  - JOUR\nTI  - Leaf Development\nAU  - Lee, K\nPY  - 2018/03/01\nJO  - Plant J\nDO  - 10.1111/tpj.13800\nER  -\n",
        );
        tree.file(
            "zhang-notes",
            "notes.md",
            "Read later: https://www.ncbi.nlm.nih.gov/pmc/articles/PMC6712345/ and doi:10.1000/xyz123\n",
        );
        tree
    }
}
