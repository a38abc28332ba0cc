use chrono::Local;
use std::process::Command;

/// Run a git command from the crate directory, returning trimmed stdout on success.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn main() {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    // Tracked-file modifications only; untracked snapshots don't count.
    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .map(|s| !s.is_empty())
        .unwrap_or(false);

    let build_hash = if dirty {
        format!("{commit}-dirty-{}", Local::now().format("%Y%m%d-%H%M%S"))
    } else {
        commit
    };

    println!("cargo:rustc-env=BUILD_HASH={build_hash}");
    // .git lives at the workspace root, two levels up.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
}
