//! Build script for storefront crate.
//!
//! Generates a content-based hash for the stylesheet so it can be served
//! under an immutable, cache-busted filename.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    // CSS might not exist yet during initial build
    let Ok(content) = fs::read(&css_path) else {
        println!("cargo:warning=Could not read {}", css_path.display());
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };

    let digest = format!("{:x}", Sha256::digest(&content));
    let hash = &digest[..8];
    println!("cargo:rustc-env=CSS_HASH={hash}");

    let derived_dir = Path::new(&manifest_dir).join("static/css/derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived CSS directory");

    // Stale hashed copies accumulate across edits; only the current one is linked
    if let Ok(entries) = fs::read_dir(&derived_dir) {
        for entry in entries.flatten() {
            let _ = fs::remove_file(entry.path());
        }
    }

    let derived_path = derived_dir.join(format!("main.{hash}.css"));
    fs::copy(&css_path, &derived_path).expect("Failed to copy CSS to derived directory");
}
