//! Embed the short commit hash shown by `aysa version`

use std::process::Command;

fn main() {
    let sha = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string());

    if let Some(sha) = sha.filter(|s| !s.is_empty()) {
        println!("cargo:rustc-env=AYSA_GIT_SHA={}", sha);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
}
