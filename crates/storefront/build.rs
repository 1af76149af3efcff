//! Build script for storefront crate.
//!
//! Hashes main.css so templates can bust browser caches with
//! `?v={{ ""|css_hash }}`.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        println!("cargo:rustc-env=CSS_HASH=");
        return;
    };
    let css_path = Path::new(&manifest_dir).join("static/css/main.css");

    println!("cargo:rerun-if-changed={}", css_path.display());

    let content = match fs::read(&css_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read main.css: {e}");
            println!("cargo:rustc-env=CSS_HASH=");
            return;
        }
    };

    // First 8 hex chars of SHA256
    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = hash.get(..8).unwrap_or(&hash);

    println!("cargo:rustc-env=CSS_HASH={short_hash}");
}
