use std::env;
use std::process::Command;

// `optistream --version` prints `<pkg>+g<sha>` (semver build metadata),
// falling back to the bare package version outside a git checkout.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let pkg = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let sha = env::var("GITHUB_SHA")
        .ok()
        .filter(|sha| !sha.is_empty() && sha.is_ascii())
        .or_else(|| git(&["rev-parse", "HEAD"]));

    let version = match sha {
        Some(sha) => format!("{pkg}+g{}", &sha[..sha.len().min(9)]),
        None => pkg,
    };
    println!("cargo:rustc-env=OPTISTREAM_LONG_VERSION={version}");
}

fn git(args: &[&str]) -> Option<String> {
    let out = Command::new("git").args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let text = String::from_utf8(out.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty() && text.is_ascii()).then(|| text.to_string())
}
