use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;

use common::{blog_post_pair, run_mdiff_command, workspace_dir, write_markdown};

#[rstest]
fn identical_files_render_all_unchanged(workspace_dir: TempDir) {
    let text = "# Title\n\nsome body prose\n";
    write_markdown(&workspace_dir, "old.md", text);
    write_markdown(&workspace_dir, "new.md", text);

    run_mdiff_command(workspace_dir.path(), &["old.md", "new.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- old.md"))
        .stdout(predicate::str::contains("+++ new.md"))
        .stdout(predicate::str::contains("# Title"))
        .stdout(predicate::str::contains("~").not())
        .stdout(predicate::str::contains("+- ").not());
}

#[rstest]
fn edits_show_as_markers(blog_post_pair: TempDir) {
    let output = run_mdiff_command(blog_post_pair.path(), &["old.md", "new.md"])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone())
        .expect("mdiff output is valid utf-8");

    // the reworked sentence renders as a modified pair of rows
    assert!(stdout.contains("~The rollout went smoothly overall."));
    assert!(stdout.contains("~The rollout went smoothly across every region."));

    // the inserted bullet renders as an addition
    assert!(stdout.contains("+- paging volume held steady"));

    // the shared closing sentence keeps both line numbers
    assert!(stdout.contains("One regression slipped through the canary stage."));
}

#[rstest]
fn filter_limits_rendered_operations(blog_post_pair: TempDir) {
    let output = run_mdiff_command(blog_post_pair.path(), &["old.md", "new.md", "-f", "A"])
        .assert()
        .success();

    let stdout = String::from_utf8(output.get_output().stdout.clone())
        .expect("mdiff output is valid utf-8");

    assert!(stdout.contains("+- paging volume held steady"));
    assert!(!stdout.contains("lead time improved"));
}

#[rstest]
fn invalid_filter_classes_are_rejected(blog_post_pair: TempDir) {
    run_mdiff_command(blog_post_pair.path(), &["old.md", "new.md", "-f", "AZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid filter classes"));
}

#[rstest]
fn summary_appends_structural_changes(workspace_dir: TempDir) {
    write_markdown(&workspace_dir, "old.md", "# Methods\n- step one\n");
    write_markdown(&workspace_dir, "new.md", "# Methodology\n- step one\n");

    run_mdiff_command(workspace_dir.path(), &["old.md", "new.md", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("structural changes: 2 total"))
        .stdout(predicate::str::contains("headers: 2 changed"))
        .stdout(predicate::str::contains("- # Methods"))
        .stdout(predicate::str::contains("+ # Methodology"));
}

#[rstest]
fn exit_code_flag_reports_differences(blog_post_pair: TempDir) {
    run_mdiff_command(
        blog_post_pair.path(),
        &["old.md", "new.md", "--exit-code"],
    )
    .assert()
    .code(1);
}

#[rstest]
fn exit_code_flag_passes_identical_files(workspace_dir: TempDir) {
    let text = "just the one line\n";
    write_markdown(&workspace_dir, "old.md", text);
    write_markdown(&workspace_dir, "new.md", text);

    run_mdiff_command(
        workspace_dir.path(),
        &["old.md", "new.md", "--exit-code"],
    )
    .assert()
    .success();
}

#[rstest]
fn missing_input_file_fails_with_context(workspace_dir: TempDir) {
    write_markdown(&workspace_dir, "old.md", "content\n");

    run_mdiff_command(workspace_dir.path(), &["old.md", "absent.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"))
        .stderr(predicate::str::contains("absent.md"));
}

#[rstest]
fn moved_paragraph_is_annotated(workspace_dir: TempDir) {
    write_markdown(
        &workspace_dir,
        "old.md",
        "A closing thought worth keeping around.\n\
         first filler line\n\
         second filler line\n\
         third filler line\n\
         fourth filler line\n",
    );
    write_markdown(
        &workspace_dir,
        "new.md",
        "first filler line\n\
         second filler line\n\
         third filler line\n\
         fourth filler line\n\
         A closing thought worth keeping around.\n",
    );

    run_mdiff_command(workspace_dir.path(), &["old.md", "new.md"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            ">A closing thought worth keeping around. (line 1 -> 5)",
        ));
}
