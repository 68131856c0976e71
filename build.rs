//! Build script for rdg
//!
//! Embeds version and target information in the binary.

use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=RDG_VERSION={}", version);

    if let Ok(target) = env::var("TARGET") {
        println!("cargo:rustc-env=RDG_TARGET={}", target);
    }
}
