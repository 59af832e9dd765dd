//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use collect_papers_core::{StdoutFormat, WriteMode};

/// Summarize a directory of paper folders.
///
/// Every subfolder of each input directory is treated as one paper: its
/// files are counted, its bibliography exports and notes are read for
/// metadata, and identifiers found in its documents are indexed.
#[derive(Parser, Debug, Clone)]
#[command(name = "collect-papers")]
#[command(author, version, about)]
pub struct Cli {
    /// Input directory to scan (repeatable)
    #[arg(short = 'd', long = "dir", visible_aliases = ["path", "input"], value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// How many folder levels below each input directory to summarize
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_depth: u16,

    /// Include folders whose name starts with a dot
    #[arg(long)]
    pub include_hidden: bool,

    /// Descend into symlinked folders
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Echo the summary table on stdout
    #[arg(long, value_enum, default_value_t = StdoutFormatArg::None)]
    pub stdout_format: StdoutFormatArg,

    /// Directory for default output files (default: current directory)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Summary table as CSV
    #[arg(long, value_name = "FILE")]
    pub output_csv: Option<PathBuf>,

    /// Summary table as a JSON array
    #[arg(long, value_name = "FILE")]
    pub output_json: Option<PathBuf>,

    /// Per-document parse registry
    #[arg(long, value_name = "FILE")]
    pub output_doc_registry: Option<PathBuf>,

    /// URL -> files index
    #[arg(long, value_name = "FILE")]
    pub output_url_dict: Option<PathBuf>,

    /// DOI -> files index (DOI records are written beside it)
    #[arg(long, value_name = "FILE")]
    pub output_doi_dict: Option<PathBuf>,

    /// PubMed ID -> files index
    #[arg(long, value_name = "FILE")]
    pub output_pubmed_id_dict: Option<PathBuf>,

    /// PMC ID -> files index
    #[arg(long, value_name = "FILE")]
    pub output_pmc_id_dict: Option<PathBuf>,

    /// Keep only folders that contain at least one PDF
    #[arg(long)]
    pub only_with_pdfs: bool,

    /// Maximum number of documents to parse in this run (negative counts as 0)
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub paper_max: i64,

    /// Skip documents already parsed (this run or the persisted registry)
    #[arg(long)]
    pub skip_parsed: bool,

    /// Write only the outputs given explicitly
    #[arg(long)]
    pub no_default_outputs: bool,

    /// Merge into existing output files or replace them
    #[arg(long, value_enum, default_value_t = WriteModeArg::Append)]
    pub output_write_mode: WriteModeArg,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StdoutFormatArg {
    Csv,
    Json,
    None,
}

impl From<StdoutFormatArg> for StdoutFormat {
    fn from(value: StdoutFormatArg) -> Self {
        match value {
            StdoutFormatArg::Csv => Self::Csv,
            StdoutFormatArg::Json => Self::Json,
            StdoutFormatArg::None => Self::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WriteModeArg {
    Append,
    Overwrite,
}

impl From<WriteModeArg> for WriteMode {
    fn from(value: WriteModeArg) -> Self {
        match value {
            WriteModeArg::Append => Self::Append,
            WriteModeArg::Overwrite => Self::Overwrite,
        }
    }
}

impl From<WriteMode> for WriteModeArg {
    fn from(value: WriteMode) -> Self {
        match value {
            WriteMode::Append => Self::Append,
            WriteMode::Overwrite => Self::Overwrite,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let cli = Cli::try_parse_from(["collect-papers"]).unwrap();
        assert!(cli.dirs.is_empty());
        assert_eq!(cli.max_depth, 1);
        assert_eq!(cli.paper_max, 1);
        assert_eq!(cli.stdout_format, StdoutFormatArg::None);
        assert_eq!(cli.output_write_mode, WriteModeArg::Append);
        assert!(!cli.no_default_outputs);
    }

    #[test]
    fn test_cli_dir_aliases_accumulate() {
        let cli = Cli::try_parse_from([
            "collect-papers",
            "-d",
            "/a",
            "--dir",
            "/b",
            "--path",
            "/c",
            "--input",
            "/d",
        ])
        .unwrap();
        assert_eq!(
            cli.dirs,
            vec![
                PathBuf::from("/a"),
                PathBuf::from("/b"),
                PathBuf::from("/c"),
                PathBuf::from("/d")
            ]
        );
    }

    #[test]
    fn test_cli_value_enums() {
        let cli = Cli::try_parse_from([
            "collect-papers",
            "--stdout-format",
            "json",
            "--output-write-mode",
            "overwrite",
        ])
        .unwrap();
        assert_eq!(StdoutFormat::from(cli.stdout_format), StdoutFormat::Json);
        assert_eq!(WriteMode::from(cli.output_write_mode), WriteMode::Overwrite);

        assert!(Cli::try_parse_from(["collect-papers", "--stdout-format", "xml"]).is_err());
    }

    #[test]
    fn test_cli_accepts_negative_paper_max() {
        let cli = Cli::try_parse_from(["collect-papers", "--paper-max", "-1"]).unwrap();
        assert_eq!(cli.paper_max, -1);
    }

    #[test]
    fn test_cli_rejects_zero_max_depth() {
        assert!(Cli::try_parse_from(["collect-papers", "--max-depth", "0"]).is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let cli = Cli::try_parse_from(["collect-papers", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Cli::try_parse_from(["collect-papers", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
