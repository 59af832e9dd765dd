use std::path::PathBuf;

use clap::{ArgMatches, CommandFactory, FromArgMatches, parser::ValueSource};
use collect_papers_core::{OutputPaths, ScanOptions, SubdirOptions, WriteMode};

use crate::app_config::{FileConfig, VerbositySetting};
use crate::cli::Cli;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CliValueSources {
    pub(crate) dirs: bool,
    pub(crate) output_dir: bool,
    pub(crate) max_depth: bool,
    pub(crate) paper_max: bool,
    pub(crate) skip_parsed: bool,
    pub(crate) include_hidden: bool,
    pub(crate) follow_symlinks: bool,
    pub(crate) only_with_pdfs: bool,
    pub(crate) output_write_mode: bool,
    pub(crate) verbose: bool,
    pub(crate) quiet: bool,
}

pub(crate) fn parse_cli_with_sources() -> (Cli, CliValueSources) {
    let command = Cli::command();
    let matches = command.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit());
    let sources = cli_value_sources(&matches);
    (cli, sources)
}

fn cli_value_sources(matches: &ArgMatches) -> CliValueSources {
    CliValueSources {
        dirs: is_commandline_value(matches, "dirs"),
        output_dir: is_commandline_value(matches, "output_dir"),
        max_depth: is_commandline_value(matches, "max_depth"),
        paper_max: is_commandline_value(matches, "paper_max"),
        skip_parsed: is_commandline_value(matches, "skip_parsed"),
        include_hidden: is_commandline_value(matches, "include_hidden"),
        follow_symlinks: is_commandline_value(matches, "follow_symlinks"),
        only_with_pdfs: is_commandline_value(matches, "only_with_pdfs"),
        output_write_mode: is_commandline_value(matches, "output_write_mode"),
        verbose: is_commandline_value(matches, "verbose"),
        quiet: is_commandline_value(matches, "quiet"),
    }
}

fn is_commandline_value(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Fills every value not given on the command line from the config file.
pub(crate) fn apply_config_defaults(
    mut cli: Cli,
    cli_sources: &CliValueSources,
    file_config: Option<&FileConfig>,
) -> Cli {
    let Some(file_config) = file_config else {
        return cli;
    };

    if !cli_sources.dirs
        && cli.dirs.is_empty()
        && let Some(paper_dir) = &file_config.paper_dir
    {
        cli.dirs.push(paper_dir.clone());
    }

    if !cli_sources.output_dir
        && cli.output_dir.is_none()
        && let Some(output_dir) = &file_config.output_dir
    {
        cli.output_dir = Some(output_dir.clone());
    }

    if !cli_sources.max_depth
        && let Some(max_depth) = file_config.max_depth
    {
        cli.max_depth = max_depth;
    }

    if !cli_sources.paper_max
        && let Some(paper_max) = file_config.paper_max
    {
        cli.paper_max = i64::try_from(paper_max).unwrap_or(i64::MAX);
    }

    if !cli_sources.output_write_mode
        && let Some(mode) = file_config.output_write_mode
    {
        cli.output_write_mode = mode.into();
    }

    apply_config_flag(&mut cli.skip_parsed, cli_sources.skip_parsed, file_config.skip_parsed);
    apply_config_flag(&mut cli.include_hidden, cli_sources.include_hidden, file_config.include_hidden);
    apply_config_flag(&mut cli.follow_symlinks, cli_sources.follow_symlinks, file_config.follow_symlinks);
    apply_config_flag(&mut cli.only_with_pdfs, cli_sources.only_with_pdfs, file_config.only_with_pdfs);

    if !cli_sources.verbose
        && !cli_sources.quiet
        && let Some(verbosity) = file_config.verbosity
    {
        apply_config_verbosity(&mut cli, verbosity);
    }

    cli
}

fn apply_config_flag(flag: &mut bool, from_cli: bool, configured: Option<bool>) {
    if !from_cli
        && !*flag
        && let Some(value) = configured
    {
        *flag = value;
    }
}

fn apply_config_verbosity(cli: &mut Cli, verbosity: VerbositySetting) {
    match verbosity {
        VerbositySetting::Default => {
            cli.quiet = false;
            cli.verbose = 0;
        }
        VerbositySetting::Verbose => {
            cli.quiet = false;
            cli.verbose = 1;
        }
        VerbositySetting::Quiet => {
            cli.quiet = true;
            cli.verbose = 0;
        }
        VerbositySetting::Debug => {
            cli.quiet = false;
            cli.verbose = 2;
        }
    }
}

pub(crate) fn resolve_default_log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

pub(crate) fn should_force_cli_log_level(cli_sources: &CliValueSources) -> bool {
    cli_sources.verbose || cli_sources.quiet
}

pub(crate) fn verbosity_label(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        VerbositySetting::Quiet.as_str()
    } else if verbose == 0 {
        VerbositySetting::Default.as_str()
    } else if verbose == 1 {
        VerbositySetting::Verbose.as_str()
    } else {
        VerbositySetting::Debug.as_str()
    }
}

pub(crate) fn scan_options(cli: &Cli) -> ScanOptions {
    ScanOptions {
        subdirs: SubdirOptions {
            max_depth: usize::from(cli.max_depth),
            include_hidden: cli.include_hidden,
            follow_symlinks: cli.follow_symlinks,
        },
        only_with_pdfs: cli.only_with_pdfs,
    }
}

/// Explicit output paths, plus defaults in the output directory unless disabled.
pub(crate) fn resolve_output_paths(cli: &Cli) -> OutputPaths {
    let explicit = OutputPaths {
        summary_csv: cli.output_csv.clone(),
        summary_json: cli.output_json.clone(),
        doc_registry: cli.output_doc_registry.clone(),
        url_index: cli.output_url_dict.clone(),
        doi_index: cli.output_doi_dict.clone(),
        pmid_index: cli.output_pubmed_id_dict.clone(),
        pmcid_index: cli.output_pmc_id_dict.clone(),
    };
    if cli.no_default_outputs {
        return explicit;
    }
    let output_dir = cli.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    explicit.or_defaults_in(&output_dir)
}

/// Parse budget for the run; negative `--paper-max` values clamp to zero.
pub(crate) fn paper_budget(cli: &Cli) -> u64 {
    u64::try_from(cli.paper_max).unwrap_or(0)
}

pub(crate) fn write_mode(cli: &Cli) -> WriteMode {
    cli.output_write_mode.into()
}
