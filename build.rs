//! Build script: validates rationale-keywords.json at compile time.

use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "rationale-keywords.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", config_path.display());

    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. rationale-keywords.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    let keywords: Vec<String> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "rationale-keywords.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    if keywords.is_empty() {
        panic!("rationale-keywords.json must list at least one keyword");
    }
    if let Some(pos) = keywords.iter().position(|k| k.trim().is_empty()) {
        panic!("rationale-keywords.json entry {} is blank", pos);
    }
}
