use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use collect_papers_core::output::{load_document_registry, render_stdout};
use collect_papers_core::{
    DocumentRegistry, NoProgress, ParseBudget, ScanContext, StdoutFormat, run_scan,
    validate_roots, write_outputs,
};
use tracing::{debug, error, info, warn};

use crate::ProcessExit;
use crate::app::progress::ScanSpinner;
use crate::app::{config_runtime, terminal};
use crate::app_config::load_default_file_config;

pub(crate) fn run_collect() -> Result<ProcessExit> {
    let (cli, cli_sources) = config_runtime::parse_cli_with_sources();
    let loaded = load_default_file_config()?;
    let cli = config_runtime::apply_config_defaults(cli, &cli_sources, loaded.config.as_ref());

    let default_level = config_runtime::resolve_default_log_level(&cli);
    let force_cli_log_level = config_runtime::should_force_cli_log_level(&cli_sources);
    terminal::init_tracing(default_level, force_cli_log_level, terminal::is_no_color_requested(&cli));

    if let (Some(path), Some(_)) = (&loaded.path, &loaded.config) {
        debug!(path = %path.display(), "Loaded config file");
    }
    debug!(
        verbosity = config_runtime::verbosity_label(cli.verbose, cli.quiet),
        "CLI arguments resolved"
    );

    let roots = match validate_roots(&cli.dirs) {
        Ok(roots) => roots,
        Err(e) => {
            error!(error = %e, "No valid input directories, exiting");
            return Ok(ProcessExit::NoValidRoots);
        }
    };

    let output_paths = config_runtime::resolve_output_paths(&cli);
    let write_mode = config_runtime::write_mode(&cli);
    let budget = ParseBudget::new(config_runtime::paper_budget(&cli), cli.skip_parsed);
    info!(
        roots = roots.len(),
        paper_max = cli.paper_max,
        skip_parsed = cli.skip_parsed,
        mode = %write_mode,
        "Collect papers starting"
    );

    let registry = if cli.skip_parsed {
        output_paths
            .doc_registry
            .as_deref()
            .and_then(load_document_registry)
            .unwrap_or_default()
    } else {
        DocumentRegistry::new()
    };
    let mut ctx = ScanContext::with_registry(budget, registry);

    let options = config_runtime::scan_options(&cli);
    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        cli.quiet,
        terminal::is_dumb_terminal(),
    );
    let report = if use_spinner {
        let mut spinner = ScanSpinner::start();
        let report = run_scan(&mut ctx, &roots, options, &mut spinner);
        spinner.finish();
        report
    } else {
        run_scan(&mut ctx, &roots, options, &mut NoProgress)
    };
    if report.stopped_by_limit {
        warn!(paper_max = cli.paper_max, "Parse budget spent, remaining folders not scanned");
    }

    let stdout_format = StdoutFormat::from(cli.stdout_format);
    if let Some(text) = render_stdout(&report.summaries, stdout_format)? {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes()).context("Failed to write summary to stdout")?;
        if !text.ends_with('\n') {
            writeln!(stdout).context("Failed to write summary to stdout")?;
        }
    }

    let failures = write_outputs(&output_paths, &ctx, &report.summaries, write_mode);
    info!(
        folders = report.summaries.len(),
        documents = ctx.registry.len(),
        output_failures = failures,
        "Collect papers finished"
    );
    Ok(ProcessExit::Success)
}
