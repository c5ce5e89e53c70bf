//! Build script for buildstamp.
//!
//! Generates the version string shown by `--version`:
//! MAJOR.MINOR.PATCH, or MAJOR.MINOR.PATCH+g<short-hash> when built from a
//! git checkout.

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    let commit = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .unwrap_or_default();

    let full_version = if commit.is_empty() {
        version
    } else {
        format!("{version}+g{commit}")
    };

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("version.txt");
    fs::write(&dest_path, full_version).expect("failed to write version.txt");

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=Cargo.toml");
    // Only watch git state when there is a checkout; a missing path would
    // make cargo rerun this script on every build.
    if Path::new(".git/HEAD").exists() {
        println!("cargo:rerun-if-changed=.git/HEAD");
    }
}
