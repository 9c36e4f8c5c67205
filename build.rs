//! Stamps the build time, git revision and compiler version into the crate
//! as `BUILD_TIME`, `GIT_HASH` and `RUST_VERSION`

use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let docs_rs = std::env::var_os("DOCS_RS").is_some();

    let build_time = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    let git_hash = if docs_rs {
        Some("docs-rs-build".to_string())
    } else {
        first_line_of("git", &["rev-parse", "--short", "HEAD"])
    };
    let rust_version = if docs_rs {
        Some("stable".to_string())
    } else {
        first_line_of("rustc", &["--version"])
    };

    println!("cargo:rustc-env=BUILD_TIME={}", build_time);
    println!(
        "cargo:rustc-env=GIT_HASH={}",
        git_hash.as_deref().unwrap_or("unknown")
    );
    println!(
        "cargo:rustc-env=RUST_VERSION={}",
        rust_version.as_deref().unwrap_or("unknown")
    );

    for path in [".git/HEAD", ".git/refs/heads/", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={}", path);
    }
}

/// First line of a command's stdout, if it ran successfully
fn first_line_of(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    stdout.lines().next().map(|line| line.trim().to_string())
}
