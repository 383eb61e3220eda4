#![allow(dead_code)]

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn workspace_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A temp dir pre-seeded with two versions of a small blog post.
#[fixture]
pub fn blog_post_pair(workspace_dir: TempDir) -> TempDir {
    write_markdown(
        &workspace_dir,
        "old.md",
        "# Launch Review\n\
         \n\
         The rollout went smoothly overall.\n\
         - lead time improved\n\
         - support tickets dropped\n\
         One regression slipped through the canary stage.\n",
    );
    write_markdown(
        &workspace_dir,
        "new.md",
        "# Launch Review\n\
         \n\
         The rollout went smoothly across every region.\n\
         - lead time improved\n\
         - support tickets dropped\n\
         - paging volume held steady\n\
         One regression slipped through the canary stage.\n",
    );

    workspace_dir
}

pub fn write_markdown(dir: &TempDir, name: &str, content: &str) {
    dir.child(name)
        .write_str(content)
        .expect("Failed to write markdown file");
}

pub fn run_mdiff_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("mdiff").expect("Failed to find mdiff binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}
