//! Temper: dry-run validation of a bundle or partial
//!
//! Runs every check over the candidate directory and collects the findings
//! into one report. Nothing is rendered and nothing is written.

pub mod checks;


use std::path::Path;

use tracing::debug;

use crate::config::{
    self, BundleKind, BundleManifest, PARTIAL_MANIFEST_FILE, PartialManifest, find_manifest,
};
use crate::domain::Diagnostic;
use crate::output::SourceTree;

/// Result of a temper run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperReport {
    pub kind: BundleKind,
    pub name: Option<String>,
    pub version: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TemperReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_error())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Validate the bundle or partial in `dir`
pub fn run(dir: &Path) -> TemperReport {
    let kind = config::detect_kind(dir);
    let mut report = TemperReport {
        kind,
        name: None,
        version: None,
        diagnostics: Vec::new(),
    };
    debug!(dir = %dir.display(), %kind, "tempering");

    if kind == BundleKind::Unknown {
        report.diagnostics.push(Diagnostic::error(format!(
            "{} contains neither forge.yaml nor {PARTIAL_MANIFEST_FILE}",
            dir.display()
        )));
        return report;
    }

    let tree = match SourceTree::scan(dir) {
        Ok(tree) => tree,
        Err(e) => {
            report.diagnostics.push(Diagnostic::error(e.to_string()));
            SourceTree::default()
        }
    };

    match kind {
        BundleKind::Bundle => temper_bundle(dir, &tree, &mut report),
        BundleKind::Partial => temper_partial(dir, &tree, &mut report),
        BundleKind::Unknown => {}
    }

    debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "temper finished"
    );
    report
}

fn temper_bundle(dir: &Path, tree: &SourceTree, report: &mut TemperReport) {
    let manifest_path = find_manifest(dir);
    let manifest_file = manifest_path
        .as_deref()
        .map_or_else(|| "forge.yaml".to_string(), file_name);
    let out = &mut report.diagnostics;

    let manifest = match BundleManifest::load(dir) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            out.push(Diagnostic::error(e.to_string()).in_file(&manifest_file));
            None
        }
    };

    if let Some(manifest) = &manifest {
        checks::manifest_shape(manifest, &manifest_file, out);
        checks::referenced_files(manifest.referenced_files(), tree, &manifest_file, out);
    }
    checks::template_syntax(dir, tree, out);
    if let Some(manifest) = &manifest {
        checks::output_sources(manifest, tree, &manifest_file, out);
    }
    checks::schema_consistency(dir, manifest.as_ref(), out);

    if let Some(manifest) = manifest {
        report.name = manifest.name;
        report.version = manifest.version;
    }
}

fn temper_partial(dir: &Path, tree: &SourceTree, report: &mut TemperReport) {
    let out = &mut report.diagnostics;
    let manifest = match PartialManifest::load(dir) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            out.push(Diagnostic::error(e.to_string()).in_file(PARTIAL_MANIFEST_FILE));
            None
        }
    };

    if let Some(manifest) = &manifest {
        checks::partial_shape(manifest, PARTIAL_MANIFEST_FILE, out);
        checks::referenced_files(
            manifest.files.iter().map(|f| ("files", f)),
            tree,
            PARTIAL_MANIFEST_FILE,
            out,
        );
    }
    checks::template_syntax(dir, tree, out);

    let fallback = file_name(dir);
    report.name = manifest
        .as_ref()
        .and_then(|m| m.name.clone())
        .or_else(|| (!fallback.is_empty()).then_some(fallback));
    report.version = manifest.and_then(|m| m.version);
}
