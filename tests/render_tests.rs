//! Integration tests for `forge render`

mod common;

use predicates::prelude::*;

fn review_workspace() -> common::TestWorkspace {
    let workspace = common::TestWorkspace::new();
    workspace.copy_fixture_bundle("review", "review");
    workspace
}

#[test]
fn test_render_fixture_bundle() {
    let workspace = review_workspace();
    workspace
        .forge_cmd()
        .args([
            "render",
            "bundles/review",
            "--target",
            "project",
            "--set",
            "org=acme",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rendered 2 files"));

    assert_eq!(
        workspace.read_file("project/.claude/commands/review.md"),
        "# acme review\nReview pull requests for acme.\nFailing checks are advisory.\n\
         Escalate to the core team.\n"
    );
    let skill = workspace.read_file("project/.claude/skills/triage/SKILL.md");
    assert!(skill.contains("Triage incoming issues for acme and route them to core."));
    assert!(!workspace.file_exists("project/README.md"));
    assert!(!workspace.file_exists("project/partials"));
    assert!(!workspace.file_exists("project/.claude/partials"));
}

#[test]
fn test_render_typed_override() {
    let workspace = review_workspace();
    workspace
        .forge_cmd()
        .args(["render", "bundles/review", "-t", "project"])
        .args(["--set", "org=acme", "--set", "strict=true", "--set", "linear.team=web"])
        .assert()
        .success();

    let review = workspace.read_file("project/.claude/commands/review.md");
    assert!(review.contains("Block on any failing check."));
    assert!(review.contains("Escalate to the web team."));
}

#[test]
fn test_render_reports_every_violation() {
    let workspace = review_workspace();
    workspace
        .forge_cmd()
        .args(["render", "bundles/review", "--target", "project"])
        .args(["--set", "strict=maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("org"))
        .stderr(predicate::str::contains("'maybe' is not a valid bool"));

    assert!(!workspace.file_exists("project/.claude"));
}

#[test]
fn test_render_malformed_override() {
    let workspace = review_workspace();
    workspace
        .forge_cmd()
        .args(["render", "bundles/review", "--target", "project", "--set", "=x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid override"));
}

#[test]
fn test_render_target_and_defaults_from_env() {
    let workspace = review_workspace();
    workspace.write_file("team.yaml", "org: from-env\nlinear:\n  team: platform\n");
    workspace
        .forge_cmd()
        .env("FORGE_TARGET", workspace.path.join("project"))
        .env("FORGE_DEFAULTS", workspace.path.join("team.yaml"))
        .args(["render", "bundles/review"])
        .assert()
        .success();

    let review = workspace.read_file("project/.claude/commands/review.md");
    assert!(review.starts_with("# from-env review"));
    assert!(review.contains("Escalate to the platform team."));
}

#[test]
fn test_render_dry_run_writes_nothing() {
    let workspace = review_workspace();
    workspace
        .forge_cmd()
        .args(["render", "bundles/review", "--target", "project", "--set", "org=acme"])
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("commands/review.md"))
        .stdout(predicate::str::contains(".claude/commands/review.md"));

    assert!(!workspace.file_exists("project/.claude"));
}

#[test]
fn test_render_unresolved_variable_warns() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "plain",
        &[
            ("forge.yaml", "name: plain\nversion: 0.1.0\n"),
            ("notes/doc.md", "Owner: {{owner.name}}"),
        ],
    );
    workspace
        .forge_cmd()
        .args(["render", "bundles/plain", "--target", "project"])
        .assert()
        .success()
        .stderr(predicate::str::contains("warning:"))
        .stderr(predicate::str::contains("notes/doc.md"))
        .stderr(predicate::str::contains("owner.name"));

    assert_eq!(workspace.read_file("project/notes/doc.md"), "Owner: ");
}

#[test]
fn test_render_partials_path_and_env_roots() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "shared",
        &[
            ("forge.yaml", "name: shared\nversion: 0.1.0\n"),
            ("rules.md", "{{partial \"style\"}}\n{{partial \"license\"}}"),
        ],
    );
    workspace.write_file("flag-root/style.md", "Style from flag");
    workspace.write_file("env-root/style.md", "Style from env");
    workspace.write_file("env-root/license.md", "License from env");

    workspace
        .forge_cmd()
        .env("FORGE_PARTIALS_PATH", workspace.path.join("env-root"))
        .args(["render", "bundles/shared", "--target", "project"])
        .args(["--partials-path", "flag-root"])
        .assert()
        .success();

    assert_eq!(
        workspace.read_file("project/rules.md"),
        "Style from flag\nLicense from env"
    );
}

#[test]
fn test_render_circular_partial_fails() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "loop",
        &[
            ("forge.yaml", "name: loop\nversion: 0.1.0\n"),
            ("doc.md", "{{partial \"a\"}}"),
            ("partials/a.md", "A {{partial \"b\"}}"),
            ("partials/b.md", "B {{partial \"a\"}}"),
        ],
    );
    workspace
        .forge_cmd()
        .args(["render", "bundles/loop", "--target", "project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular partial reference"))
        .stderr(predicate::str::contains("a -> b -> a"));

    assert!(!workspace.file_exists("project/doc.md"));
}

#[test]
fn test_render_explicit_output_mapping() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "mapped",
        &[
            (
                "forge.yaml",
                "name: mapped\nversion: 0.1.0\noutput:\n  rules: .cursor/rules\n  \
                 AGENTS.md:\n    dest: CLAUDE.md\n    process: false\n",
            ),
            ("rules/style/a.mdc", "Rule for {{org}}"),
            ("AGENTS.md", "Raw {{org}}"),
        ],
    );
    workspace
        .forge_cmd()
        .args(["render", "bundles/mapped", "--target", "project", "--set", "org=acme"])
        .assert()
        .success();

    assert_eq!(
        workspace.read_file("project/.cursor/rules/style/a.mdc"),
        "Rule for acme"
    );
    assert_eq!(workspace.read_file("project/CLAUDE.md"), "Raw {{org}}");
}

#[test]
fn test_render_missing_output_source() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "broken",
        &[
            (
                "forge.yaml",
                "name: broken\nversion: 0.1.0\noutput:\n  agents: .claude/agents\n",
            ),
            ("commands/a.md", "a"),
        ],
    );
    workspace
        .forge_cmd()
        .args(["render", "bundles/broken", "--target", "project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output source not found: agents"));
}

#[test]
fn test_render_missing_bundle() {
    let workspace = common::TestWorkspace::new();
    workspace
        .forge_cmd()
        .args(["render", "bundles/nope", "--target", "project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest not found"));
}
