//! Integration tests for a full scan: folders, gate, indexes and persisted outputs.
//!
//! These tests drive the library the way the binary does, over fixture trees
//! in temporary directories.

mod support;

use std::fs;
use std::path::Path;

use collect_papers_core::output::{doi_records_path, load_document_registry};
use collect_papers_core::registry::path_key;
use collect_papers_core::{
    DocumentKind, NoProgress, OutputPaths, ParseBudget, ScanContext, ScanOptions, WriteMode,
    run_scan, write_outputs,
};
use serde_json::Value;
use support::paper_tree::PaperTree;
use tempfile::TempDir;

fn scan(tree: &PaperTree, budget: u64) -> (ScanContext, collect_papers_core::ScanReport) {
    let mut ctx = ScanContext::new(ParseBudget::new(budget, false));
    let report = run_scan(
        &mut ctx,
        &[tree.root().to_path_buf()],
        ScanOptions::default(),
        &mut NoProgress,
    );
    (ctx, report)
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).expect("output should exist"))
        .expect("output should be valid JSON")
}

/// Test that each folder gets its best metadata from its own documents.
#[test]
fn test_scan_library_folder_metadata() {
    let tree = PaperTree::library();
    let (_ctx, report) = scan(&tree, 100);

    let names: Vec<_> = report.summaries.iter().map(|s| s.folder_name.as_str()).collect();
    assert_eq!(names, vec!["Lee_2018", "smith2020", "zhang-notes"]);

    let lee = &report.summaries[0];
    assert_eq!(lee.doi, "10.1111/tpj.13800");
    assert_eq!(lee.title, "Leaf Development");
    assert_eq!(lee.year, "2018");
    assert_eq!(lee.venue, "Plant J");
    assert_eq!(lee.num_ris, 1);

    let smith = &report.summaries[1];
    assert_eq!(smith.doi, "10.1105/tpc.20.00001");
    assert_eq!(smith.authors, "Smith, J. and Doe, A.");
    assert_eq!(smith.num_pdfs, 1);
    assert_eq!(smith.num_bibtex, 1);
    assert!(smith.example_pdf.ends_with("smith2020.pdf"));
    assert!(!smith.folder_mtime_iso.is_empty());

    let zhang = &report.summaries[2];
    assert_eq!(zhang.doi, "10.1000/xyz123");
    assert!(zhang.title.is_empty());
    assert_eq!(zhang.num_txt_md, 1);
}

/// Test that identifiers found in documents land in the run-wide indexes.
#[test]
fn test_scan_library_identifier_indexes() {
    let tree = PaperTree::library();
    let (ctx, _) = scan(&tree, 100);

    let bib = path_key(&tree.root().join("smith2020").join("smith2020.bib"));
    let notes = path_key(&tree.root().join("zhang-notes").join("notes.md"));

    let also_seen = ctx.indexes.dois.get("10.1038/s41586-019-1234-5").unwrap();
    assert!(also_seen.contains(&bib));
    assert!(ctx.indexes.urls.get("https://plantcell.org/smith2020").unwrap().contains(&bib));
    assert!(ctx.indexes.pmcids.get("PMC6712345").unwrap().contains(&notes));

    let record = ctx.doi_records.get("10.1105/tpc.20.00001").unwrap();
    assert_eq!(record.title.as_deref(), Some("Root Growth in Arabidopsis"));
    assert_eq!(record.venue.as_deref(), Some("Plant Cell"));
    let bare = ctx.doi_records.get("10.1038/s41586-019-1234-5").unwrap();
    assert!(bare.title.is_none());
    assert!(bare.sources.contains(&bib));
}

/// Test that the PDF in a complete folder is registered as seen but not parsed.
#[test]
fn test_scan_registers_unread_pdf_as_seen() {
    let tree = PaperTree::library();
    let (ctx, _) = scan(&tree, 100);

    let pdf = path_key(&tree.root().join("smith2020").join("smith2020.pdf"));
    let status = ctx.registry.get(&pdf).unwrap();
    assert_eq!(status.kind, DocumentKind::Pdf);
    assert!(!status.parsed);
    assert_eq!(status.info.is_pdf, Some(true));
    assert!(ctx.indexes.pmids.is_empty());
}

/// Test that a budget of one parses exactly one document and leaves every file counted.
#[test]
fn test_scan_budget_one_parses_single_document() {
    let tree = PaperTree::new();
    tree.file("a-paper", "one.bib", "@article{a, title = {One}}");
    tree.file("a-paper", "two.ris", "TI  - Two");
    tree.file("b-paper", "three.bib", "@article{b, title = {Three}}");

    let (ctx, report) = scan(&tree, 1);

    let parsed = ctx.registry.iter().filter(|(_, status)| status.parsed).count();
    assert_eq!(parsed, 1);
    assert_eq!(report.summaries.len(), 1);
    assert!(report.stopped_by_limit);

    let summary = &report.summaries[0];
    assert_eq!(summary.folder_name, "a-paper");
    assert_eq!(summary.num_files_total, 2);
    assert_eq!(summary.title, "One");

    let skipped = ctx
        .registry
        .get(&path_key(&tree.root().join("a-paper").join("two.ris")))
        .unwrap();
    assert_eq!(skipped.error, "skipped_by_limit");
}

/// Test that a zero budget scans no folder at all.
#[test]
fn test_scan_zero_budget_produces_no_rows() {
    let tree = PaperTree::library();
    let (ctx, report) = scan(&tree, 0);
    assert!(report.summaries.is_empty());
    assert!(ctx.registry.is_empty());
}

/// Test that a failing document never aborts its folder.
#[test]
fn test_scan_malformed_documents_are_recorded_not_fatal() {
    let tree = PaperTree::new();
    let json = tree.file("paper", "meta.json", "[1, 2, 3]");
    let docx = tree.file("paper", "notes.docx", "not a zip archive");
    tree.file("paper", "refs.ris", "TI  - Survives");

    let (ctx, report) = scan(&tree, 10);
    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].title, "Survives");

    let json_status = ctx.registry.get(&path_key(&json)).unwrap();
    assert!(!json_status.parsed);
    assert!(!json_status.error.is_empty());
    let docx_status = ctx.registry.get(&path_key(&docx)).unwrap();
    assert!(!docx_status.parsed);
    assert_eq!(ctx.budget.remaining(), 9);
}

/// Test that every artifact is written and that a second append run merges into them.
#[test]
fn test_outputs_append_across_runs() {
    let out = TempDir::new().unwrap();
    let paths = OutputPaths::defaults_in(out.path());

    let first = PaperTree::new();
    first.file("p1", "notes.txt", "doi 10.1000/a");
    let (ctx, report) = scan(&first, 10);
    assert_eq!(write_outputs(&paths, &ctx, &report.summaries, WriteMode::Append), 0);

    let second = PaperTree::new();
    second.file("p2", "notes.txt", "doi 10.1000/a and https://example.org/x");
    let (ctx, report) = scan(&second, 10);
    assert_eq!(write_outputs(&paths, &ctx, &report.summaries, WriteMode::Append), 0);

    let doi_index = read_json(&out.path().join("doi_dict.json"));
    assert_eq!(doi_index["10.1000/a"].as_array().unwrap().len(), 2);

    let summaries = read_json(&out.path().join("papers_summary.json"));
    assert_eq!(summaries.as_array().unwrap().len(), 2);

    let records = read_json(&doi_records_path(&out.path().join("doi_dict.json")));
    assert_eq!(records["10.1000/a"]["sources"].as_array().unwrap().len(), 2);

    let registry = read_json(&out.path().join("doc_registry.json"));
    assert_eq!(registry.as_object().unwrap().len(), 2);

    let csv = fs::read_to_string(out.path().join("papers_summary.csv")).unwrap();
    assert_eq!(csv.lines().count(), 2, "CSV is rewritten with this run's rows only");

    let urls = read_json(&out.path().join("url_dict.json"));
    assert!(urls.get("https://example.org/x").is_some());
    assert!(out.path().join("pubmed_id_dict.json").exists());
    assert!(out.path().join("pmc_id_dict.json").exists());
}

/// Test that overwrite mode replaces earlier artifacts.
#[test]
fn test_outputs_overwrite_replaces_previous_run() {
    let out = TempDir::new().unwrap();
    let paths = OutputPaths::defaults_in(out.path());

    let first = PaperTree::new();
    first.file("p1", "notes.txt", "doi 10.1000/a");
    let (ctx, report) = scan(&first, 10);
    write_outputs(&paths, &ctx, &report.summaries, WriteMode::Overwrite);

    let second = PaperTree::new();
    second.file("p2", "notes.txt", "doi 10.2000/b");
    let (ctx, report) = scan(&second, 10);
    write_outputs(&paths, &ctx, &report.summaries, WriteMode::Overwrite);

    let doi_index = read_json(&out.path().join("doi_dict.json"));
    assert!(doi_index.get("10.1000/a").is_none());
    assert!(doi_index.get("10.2000/b").is_some());
}

/// Test that a persisted registry lets `skip_parsed` skip documents from an earlier run.
#[test]
fn test_skip_parsed_across_runs_with_persisted_registry() {
    let out = TempDir::new().unwrap();
    let paths = OutputPaths {
        doc_registry: Some(out.path().join("doc_registry.json")),
        ..OutputPaths::default()
    };
    let tree = PaperTree::new();
    let notes = tree.file("p1", "notes.txt", "doi 10.1000/a");

    let (ctx, report) = scan(&tree, 10);
    write_outputs(&paths, &ctx, &report.summaries, WriteMode::Append);

    let registry = load_document_registry(&out.path().join("doc_registry.json")).unwrap();
    assert!(registry.is_parsed(&path_key(&notes)));

    let mut ctx = ScanContext::with_registry(ParseBudget::new(10, true), registry);
    run_scan(&mut ctx, &[tree.root().to_path_buf()], ScanOptions::default(), &mut NoProgress);
    let status = ctx.registry.get(&path_key(&notes)).unwrap();
    assert_eq!(status.error, "skipped_already_parsed");
    assert_eq!(ctx.budget.remaining(), 10);
}

/// Test that a document parsed once stays skipped on every later `skip_parsed` run.
#[test]
fn test_skip_parsed_holds_over_three_runs() {
    let out = TempDir::new().unwrap();
    let registry_path = out.path().join("doc_registry.json");
    let paths = OutputPaths {
        doc_registry: Some(registry_path.clone()),
        ..OutputPaths::default()
    };
    let tree = PaperTree::new();
    let notes = tree.file("p1", "notes.txt", "doi 10.1000/a");
    let key = path_key(&notes);

    let mut remaining = Vec::new();
    for _ in 0..3 {
        let registry = load_document_registry(&registry_path).unwrap_or_default();
        let mut ctx = ScanContext::with_registry(ParseBudget::new(10, true), registry);
        let report = run_scan(
            &mut ctx,
            &[tree.root().to_path_buf()],
            ScanOptions::default(),
            &mut NoProgress,
        );
        assert_eq!(write_outputs(&paths, &ctx, &report.summaries, WriteMode::Append), 0);
        assert!(ctx.registry.get(&key).unwrap().parsed);
        remaining.push(ctx.budget.remaining());
    }
    assert_eq!(remaining, vec![9, 10, 10]);

    let persisted = load_document_registry(&registry_path).unwrap();
    let status = persisted.get(&key).unwrap();
    assert!(status.parsed);
    assert_eq!(status.error, "skipped_already_parsed");
}
