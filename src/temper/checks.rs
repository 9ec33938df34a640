//! Individual temper checks
//!
//! Each check appends to the diagnostic list and never stops the others.

use std::path::Path;

use semver::Version;

use crate::config::{BundleManifest, PartialManifest, SchemaFile};
use crate::domain::Diagnostic;
use crate::output::{OutputSpec, SourceTree, normalize};
use crate::template;

/// Extensions of files checked for template syntax
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "mdc", "markdown", "txt", "tmpl"];

/// Top-level directories whose documents are not bundle content
const SKIPPED_DIRS: &[&str] = &["node_modules", ".github"];

/// Manifest shape: required fields, versions, requirements, variable types
pub fn manifest_shape(manifest: &BundleManifest, manifest_file: &str, out: &mut Vec<Diagnostic>) {
    out.extend(
        manifest
            .problems()
            .into_iter()
            .map(|problem| Diagnostic::error(problem).in_file(manifest_file)),
    );
}

/// Partial manifest shape: a version, when given, must be semantic
pub fn partial_shape(manifest: &PartialManifest, manifest_file: &str, out: &mut Vec<Diagnostic>) {
    if let Some(version) = &manifest.version {
        if let Err(e) = Version::parse(version) {
            out.push(
                Diagnostic::error(format!(
                    "version '{version}' is not a valid semantic version: {e}"
                ))
                .in_file(manifest_file),
            );
        }
    }
    if manifest.files.is_empty() {
        out.push(Diagnostic::warning("partial lists no files").in_file(manifest_file));
    }
}

/// Every file a manifest lists exists in the tree
pub fn referenced_files<'l, 'a>(
    references: impl IntoIterator<Item = (&'l str, &'a String)>,
    tree: &SourceTree,
    manifest_file: &str,
    out: &mut Vec<Diagnostic>,
) {
    for (list, file) in references {
        if !tree.contains_file(&normalize(file)) {
            out.push(
                Diagnostic::error(format!("{list} entry '{file}' does not exist"))
                    .in_file(manifest_file),
            );
        }
    }
}

fn is_document(path: &str) -> bool {
    let top = path.split('/').next().unwrap_or(path);
    if path.contains('/') && SKIPPED_DIRS.contains(&top) {
        return false;
    }
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Every document parses under shorthand expansion
pub fn template_syntax(root: &Path, tree: &SourceTree, out: &mut Vec<Diagnostic>) {
    for path in tree.iter().filter(|p| is_document(p)) {
        let text = match std::fs::read(root.join(path)) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    out.push(
                        Diagnostic::warning("not valid UTF-8; template syntax not checked")
                            .in_file(path),
                    );
                    continue;
                }
            },
            Err(e) => {
                out.push(Diagnostic::error(format!("cannot read file: {e}")).in_file(path));
                continue;
            }
        };
        if let Err(e) = template::check_syntax(path, &text) {
            let reason = match e {
                crate::error::ForgeError::TemplateParseFailed { reason, .. } => reason,
                other => other.to_string(),
            };
            out.push(Diagnostic::error(format!("template syntax error: {reason}")).in_file(path));
        }
    }
}

/// The output declaration parses and every declared source exists
pub fn output_sources(
    manifest: &BundleManifest,
    tree: &SourceTree,
    manifest_file: &str,
    out: &mut Vec<Diagnostic>,
) {
    let result =
        OutputSpec::from_yaml(manifest.output.as_ref()).and_then(|spec| spec.resolve(tree));
    if let Err(e) = result {
        out.push(Diagnostic::error(e.to_string()).in_file(manifest_file));
    }
}

/// Schema file parses, and declaring variables in both places is flagged
pub fn schema_consistency(
    root: &Path,
    manifest: Option<&BundleManifest>,
    out: &mut Vec<Diagnostic>,
) {
    let schema_name = crate::config::find_schema(root).map(|p| {
        p.file_name()
            .map_or_else(|| "flux.yaml".to_string(), |n| n.to_string_lossy().into_owned())
    });
    let Some(schema_name) = schema_name else {
        return;
    };

    let file = match SchemaFile::load(root) {
        Ok(Some(file)) => file,
        Ok(None) => return,
        Err(e) => {
            out.push(Diagnostic::error(e.to_string()).in_file(&schema_name));
            return;
        }
    };

    for decl in &file.flux {
        if let Err(problem) = decl.to_variable() {
            out.push(Diagnostic::error(problem).in_file(&schema_name));
        }
    }

    if manifest.is_some_and(|m| !m.flux.is_empty()) && !file.flux.is_empty() {
        out.push(
            Diagnostic::warning(format!(
                "variables are declared in both the manifest and {schema_name}; \
                 {schema_name} wins at render time"
            ))
            .in_file(&schema_name),
        );
    }
}
