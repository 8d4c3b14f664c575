//! Stamps the binary with its release identity, reported by `/status`.
//!
//! CI may set `CATERING_VERSION` and `CATERING_GIT_SHA` directly. Otherwise
//! the version comes from a release tag (`v1.4.0`) on the checked-out commit
//! and the SHA from git; local builds without git report the package version
//! and "unknown".

use std::env;
use std::process::Command;

const SHORT_SHA: usize = 7;

fn main() {
    for var in [
        "CATERING_VERSION",
        "CATERING_GIT_SHA",
        "GITHUB_REF_NAME",
        "GITHUB_SHA",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let version = env::var("CATERING_VERSION")
        .ok()
        .or_else(|| env::var("GITHUB_REF_NAME").ok().and_then(|r| release_version(&r)))
        .or_else(|| git(&["describe", "--tags", "--exact-match"]).and_then(|t| release_version(&t)))
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    let git_sha = env::var("CATERING_GIT_SHA")
        .ok()
        .or_else(|| env::var("GITHUB_SHA").ok())
        .or_else(|| git(&["rev-parse", "HEAD"]))
        .map(|sha| sha.trim().chars().take(SHORT_SHA).collect::<String>())
        .filter(|sha| !sha.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=CATERING_VERSION={version}");
    println!("cargo:rustc-env=CATERING_GIT_SHA={git_sha}");
}

/// `v1.4.0` and `1.4.0` are releases; branch names are not
fn release_version(tag: &str) -> Option<String> {
    let version = tag.trim().trim_start_matches('v');
    version
        .starts_with(|c: char| c.is_ascii_digit())
        .then(|| version.to_string())
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
