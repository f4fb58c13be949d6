use std::process::Command;

/// Short commit hash, suffixed `-dirty` when the work tree has changes
fn git_version() -> Option<String> {
    let head = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let hash = String::from_utf8_lossy(&head.stdout).trim().to_string();

    let dirty = Command::new("git")
        .args(["diff", "--quiet"])
        .status()
        .map(|s| !s.success())
        .unwrap_or(false);

    Some(if dirty { format!("{hash}-dirty") } else { hash })
}

fn main() {
    // Release pipelines without a .git directory pass the version in
    let version = std::env::var("WALLET_LEDGER_VERSION")
        .ok()
        .or_else(git_version)
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={version}");
    println!("cargo:rerun-if-env-changed=WALLET_LEDGER_VERSION");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads");
}
