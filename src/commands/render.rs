//! Render command implementation
//!
//! The render process:
//! 1. Load and validate the bundle manifest
//! 2. Build the effective flux schema (a separate flux.yaml wins)
//! 3. Layer inline defaults, the defaults file and `--set` overrides
//! 4. Prompt for anything still missing (with `--interactive`)
//! 5. Validate the context, collecting every violation
//! 6. Resolve the output mapping
//! 7. Render every processed file in memory, then write all files
//!
//! Nothing is written unless every step before the write succeeds.

use std::path::Path;

use console::Style;
use tracing::{debug, info};

use crate::cli::RenderArgs;
use crate::config::{BundleManifest, SchemaFile, effective_schema, load_defaults};
use crate::domain::{Diagnostic, ResolvedFile};
use crate::error::Result;
use crate::flux::{self, Context, Override};
use crate::output::{OutputSpec, SourceTree};
use crate::partial::PartialResolver;
use crate::progress::ProgressDisplay;
use crate::prompt;
use crate::template;
use crate::ui;
use crate::writer;

/// What a render produced
#[derive(Debug, Default)]
pub struct RenderOutcome {
    /// Planned (or written) files, sorted by source
    pub files: Vec<ResolvedFile>,
    /// Non-fatal findings, such as unresolved template variables
    pub warnings: Vec<Diagnostic>,
    /// Files written to the target; zero for a dry run
    pub written: usize,
}

/// Content ready to be written
enum Prepared {
    Rendered(String),
    Copy,
}

/// Run the render command
pub fn run(args: RenderArgs) -> Result<()> {
    let target = match &args.target {
        Some(target) => target.clone(),
        None => std::env::current_dir()?,
    };

    let outcome = render_bundle(&args.bundle, &target, &args)?;
    ui::print_diagnostics(&outcome.warnings);

    if args.dry_run {
        println!(
            "{} {}",
            Style::new().bold().apply_to("Dry run, would write into"),
            target.display()
        );
        ui::display_plan(&outcome.files);
    } else {
        println!(
            "{} {} into {}",
            Style::new().green().bold().apply_to("Rendered"),
            match outcome.written {
                1 => "1 file".to_string(),
                n => format!("{n} files"),
            },
            target.display()
        );
    }
    Ok(())
}

/// Resolve variables for the bundle: layering, prompting and validation
fn resolve_context(
    bundle: &Path,
    manifest: &BundleManifest,
    args: &RenderArgs,
) -> Result<(crate::domain::FluxSchema, Context)> {
    let schema_file = SchemaFile::load(bundle)?;
    let schema = effective_schema(manifest, schema_file.as_ref())?;

    let defaults = match &args.defaults {
        Some(path) => load_defaults(path)?,
        None => Context::new(),
    };
    let overrides = Override::parse_all(&args.overrides)?;

    let mut context = flux::resolve(&schema, &defaults, &overrides);
    if args.interactive {
        context = prompt::prompt_missing(&schema, &context)?;
    }
    flux::ensure_valid(&schema, &context)?;
    Ok((schema, context))
}

/// Render `bundle` into `target` according to `args`
pub fn render_bundle(bundle: &Path, target: &Path, args: &RenderArgs) -> Result<RenderOutcome> {
    let manifest = BundleManifest::load(bundle)?;
    manifest.validate()?;
    manifest.check_requires(env!("CARGO_PKG_VERSION"))?;
    debug!(bundle = manifest.display_name(), "loaded manifest");

    let (schema, context) = resolve_context(bundle, &manifest, args)?;
    let data = flux::render_data(&schema, &context);

    let tree = SourceTree::scan(bundle)?;
    let files = OutputSpec::from_yaml(manifest.output.as_ref())?.resolve(&tree)?;
    for file in &files {
        writer::target_path(target, &file.destination)?;
    }

    let mut outcome = RenderOutcome {
        files,
        ..RenderOutcome::default()
    };
    if args.dry_run {
        return Ok(outcome);
    }

    let resolver = PartialResolver::for_bundle(bundle, &args.partials_path);
    let mut prepared = Vec::with_capacity(outcome.files.len());
    for file in &outcome.files {
        let content = if file.process {
            prepare(bundle, file, &data, &resolver, &mut outcome.warnings)?
        } else {
            Prepared::Copy
        };
        prepared.push(content);
    }

    let progress = ProgressDisplay::new(outcome.files.len() as u64);
    for (file, content) in outcome.files.iter().zip(prepared) {
        progress.update_file(&file.destination);
        let result = write_one(bundle, target, file, content);
        if let Err(e) = result {
            progress.abandon();
            return Err(e);
        }
        outcome.written += 1;
    }
    progress.finish();

    Ok(outcome)
}

/// Render one processed file; files that are not UTF-8 are copied as-is
fn prepare(
    bundle: &Path,
    file: &ResolvedFile,
    data: &serde_json::Value,
    resolver: &PartialResolver,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Prepared> {
    let path = bundle.join(&file.source);
    let bytes = std::fs::read(&path)
        .map_err(|e| crate::error::fs::read_failed(path.display().to_string(), e.to_string()))?;
    let Ok(text) = String::from_utf8(bytes) else {
        debug!(file = %file.source, "not UTF-8, copying verbatim");
        return Ok(Prepared::Copy);
    };
    let rendered = template::render(&file.source, &text, data, Some(resolver), warnings)?;
    Ok(Prepared::Rendered(rendered))
}

fn write_one(bundle: &Path, target: &Path, file: &ResolvedFile, content: Prepared) -> Result<()> {
    let destination = writer::target_path(target, &file.destination)?;
    match content {
        Prepared::Rendered(text) => writer::write_atomic(&destination, text.as_bytes())?,
        Prepared::Copy => writer::copy_file(&bundle.join(&file.source), &destination)?,
    }
    info!(source = %file.source, destination = %file.destination, "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForgeError;
    use crate::test_fixtures::{create_bundle, create_temp_dir};
    use std::path::PathBuf;

    fn args(overrides: &[&str]) -> RenderArgs {
        RenderArgs {
            bundle: PathBuf::new(),
            target: None,
            overrides: overrides.iter().map(ToString::to_string).collect(),
            defaults: None,
            partials_path: Vec::new(),
            interactive: false,
            dry_run: false,
        }
    }

    fn read(root: &Path, path: &str) -> String {
        std::fs::read_to_string(root.join(path)).unwrap()
    }

    const REVIEW_MANIFEST: &str = "name: review\nversion: 1.0.0\noutput: .claude\n\
        flux:\n  - name: org\n    required: true\n  - name: tone\n    default: friendly\n";

    #[test]
    fn test_render_writes_under_parent_path() {
        let bundle = create_bundle(&[
            ("forge.yaml", REVIEW_MANIFEST),
            ("commands/review.md", "Review for {{org}} in a {{tone}} tone"),
            ("AGENTS.md", "Agents of {{org}}"),
        ]);
        let target = create_temp_dir();
        let outcome = render_bundle(bundle.path(), target.path(), &args(&["org=acme"])).unwrap();

        assert_eq!(outcome.written, 2);
        assert!(outcome.warnings.is_empty());
        assert_eq!(
            read(target.path(), ".claude/commands/review.md"),
            "Review for acme in a friendly tone"
        );
        assert_eq!(read(target.path(), "AGENTS.md"), "Agents of acme");
        assert!(!target.path().join("forge.yaml").exists());
    }

    #[test]
    fn test_validation_failure_writes_nothing() {
        let bundle = create_bundle(&[
            ("forge.yaml", REVIEW_MANIFEST),
            ("commands/review.md", "{{org}}"),
        ]);
        let target = create_temp_dir();
        let err = render_bundle(bundle.path(), target.path(), &args(&[])).unwrap_err();
        match err {
            ForgeError::FluxValidationFailed { violations } => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("org"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unresolved_variable_is_a_warning() {
        let bundle = create_bundle(&[
            ("forge.yaml", "name: x\nversion: 1.0.0\n"),
            ("doc.md", "Hello {{who}}!"),
        ]);
        let target = create_temp_dir();
        let outcome = render_bundle(bundle.path(), target.path(), &args(&[])).unwrap();
        assert_eq!(read(target.path(), "doc.md"), "Hello !");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].file.as_deref(), Some("doc.md"));
    }

    #[test]
    fn test_unprocessed_files_are_copied_verbatim() {
        let bundle = create_bundle(&[
            (
                "forge.yaml",
                "name: x\nversion: 1.0.0\noutput:\n  raw:\n    dest: kept\n    process: false\n",
            ),
            ("raw/t.md", "{{ not rendered"),
        ]);
        let target = create_temp_dir();
        render_bundle(bundle.path(), target.path(), &args(&[])).unwrap();
        assert_eq!(read(target.path(), "kept/t.md"), "{{ not rendered");
    }

    #[test]
    fn test_partials_and_defaults_file() {
        let bundle = create_bundle(&[
            (
                "forge.yaml",
                "name: x\nversion: 1.0.0\nflux:\n  - name: linear.team\n    required: true\n",
            ),
            ("partials/header.md", "# {{linear.team}} team"),
            ("commands/plan.md", "{{partial \"header\"}}\nPlan"),
        ]);
        let defaults = create_temp_dir();
        let defaults_file = defaults.path().join("team.yaml");
        std::fs::write(&defaults_file, "linear:\n  team: core\n").unwrap();

        let target = create_temp_dir();
        let mut render_args = args(&[]);
        render_args.defaults = Some(defaults_file);
        render_bundle(bundle.path(), target.path(), &render_args).unwrap();
        assert_eq!(read(target.path(), "commands/plan.md"), "# core team\nPlan");
        assert!(!target.path().join("partials").exists());
    }

    #[test]
    fn test_override_beats_defaults_file() {
        let bundle = create_bundle(&[
            ("forge.yaml", "name: x\nversion: 1.0.0\n"),
            ("a.md", "{{org}}"),
        ]);
        let defaults = create_temp_dir();
        let defaults_file = defaults.path().join("d.yaml");
        std::fs::write(&defaults_file, "org: from-file\n").unwrap();

        let target = create_temp_dir();
        let mut render_args = args(&["org=from-flag"]);
        render_args.defaults = Some(defaults_file);
        render_bundle(bundle.path(), target.path(), &render_args).unwrap();
        assert_eq!(read(target.path(), "a.md"), "from-flag");
    }

    #[test]
    fn test_dry_run_plans_without_writing() {
        let bundle = create_bundle(&[
            ("forge.yaml", REVIEW_MANIFEST),
            ("commands/review.md", "{{org}}"),
        ]);
        let target = create_temp_dir();
        let mut render_args = args(&["org=acme"]);
        render_args.dry_run = true;
        let outcome = render_bundle(bundle.path(), target.path(), &render_args).unwrap();
        assert_eq!(outcome.written, 0);
        assert_eq!(
            outcome.files,
            vec![ResolvedFile::new("commands/review.md", ".claude/commands/review.md", true)]
        );
        assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_template_error_writes_nothing() {
        let bundle = create_bundle(&[
            ("forge.yaml", "name: x\nversion: 1.0.0\n"),
            ("a.md", "fine"),
            ("b.md", "{{partial \"missing\"}}"),
        ]);
        let target = create_temp_dir();
        let err = render_bundle(bundle.path(), target.path(), &args(&[])).unwrap_err();
        assert!(matches!(err, ForgeError::PartialNotFound { .. }));
        assert_eq!(std::fs::read_dir(target.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_requires_newer_forge() {
        let bundle =
            create_bundle(&[("forge.yaml", "name: x\nversion: 1.0.0\nrequires: '>=99'\n")]);
        let target = create_temp_dir();
        let err = render_bundle(bundle.path(), target.path(), &args(&[])).unwrap_err();
        assert!(err.to_string().contains("requires forge"));
    }

    #[test]
    fn test_destination_escaping_target_is_rejected() {
        let bundle = create_bundle(&[
            ("forge.yaml", "name: x\nversion: 1.0.0\noutput:\n  a.md: ../a.md\n"),
            ("a.md", "a"),
        ]);
        let target = create_temp_dir();
        assert!(render_bundle(bundle.path(), target.path(), &args(&[])).is_err());
    }
}
