//! Integration tests for `forge temper`

mod common;

use predicates::prelude::*;

#[test]
fn test_temper_clean_bundle() {
    let workspace = common::TestWorkspace::new();
    workspace.copy_fixture_bundle("review", "review");
    workspace
        .forge_cmd()
        .args(["temper", "bundles/review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("1.0.0"))
        .stdout(predicate::str::contains("No problems found."));
}

#[test]
fn test_temper_reports_errors_and_fails() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "broken",
        &[
            (
                "forge.yaml",
                "name: broken\nversion: latest\ncommands: [commands/gone.md]\n",
            ),
            ("commands/bad.md", "{{if .x}}unterminated"),
        ],
    );
    workspace
        .forge_cmd()
        .args(["temper", "bundles/broken"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("not a valid semantic version"))
        .stdout(predicate::str::contains("commands entry 'commands/gone.md' does not exist"))
        .stdout(predicate::str::contains("commands/bad.md"))
        .stdout(predicate::str::contains("3 errors"));
}

#[test]
fn test_temper_warnings_do_not_fail() {
    let workspace = common::TestWorkspace::new();
    workspace.create_bundle(
        "twice",
        &[
            ("forge.yaml", "name: twice\nversion: 0.1.0\nflux:\n  - name: org\n"),
            ("flux.yaml", "flux:\n  - name: org\n    required: true\n"),
        ],
    );
    workspace
        .forge_cmd()
        .args(["temper", "bundles/twice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 errors, 1 warning"));
}

#[test]
fn test_temper_partial_directory() {
    let workspace = common::TestWorkspace::new();
    workspace.write_file(
        "standards/partial.yaml",
        "name: standards\nversion: 0.2.0\nfiles: [intro.md]\n",
    );
    workspace.write_file("standards/intro.md", "Standards for {{org}}");
    workspace
        .forge_cmd()
        .args(["temper", "standards"])
        .assert()
        .success()
        .stdout(predicate::str::contains("partial"))
        .stdout(predicate::str::contains("standards"));
}

#[test]
fn test_temper_directory_without_manifest() {
    let workspace = common::TestWorkspace::new();
    workspace.write_file("empty/notes.md", "nothing");
    workspace
        .forge_cmd()
        .args(["temper", "empty"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("neither forge.yaml nor partial.yaml"));
}

#[test]
fn test_temper_missing_directory() {
    let workspace = common::TestWorkspace::new();
    workspace
        .forge_cmd()
        .args(["temper", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Manifest not found"));
}
