//! Layering guardrails to keep the naming core dependency-free.
//!
//! `contexts_core` is shared by the runner and the `#[spec]` macro, so it may only carry dev-dependencies.
//! This test scans its `Cargo.toml` and fails if anything appears in `[dependencies]`.

#[test]
fn core_crate_has_no_runtime_dependencies() {
    let manifest = include_str!("../crates/contexts_core/Cargo.toml");
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if !line_no_comment.is_empty() {
            panic!("`contexts_core` must not depend on other crates, found `{line_no_comment}`");
        }
    }
}

#[test]
fn derive_crate_only_depends_on_the_core_and_syn_stack() {
    let manifest = include_str!("../crates/contexts_derive/Cargo.toml");
    let allowed = ["contexts_core", "syn", "quote", "proc-macro2"];
    let mut in_dependencies = false;

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let name = line.split(['=', ' ']).next().unwrap_or("");
        assert!(allowed.contains(&name), "unexpected dependency of `contexts_derive`: `{name}`");
    }
}
