fn main() {
    use std::process::Command;
    fn cmd_out(args: &[&str]) -> String {
        Command::new(args[0])
            .args(&args[1..])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .unwrap_or_default()
            .trim()
            .to_string()
    }
    let git = std::env::var("PDX_GIT_SHA")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| {
            cmd_out(&[
                "bash",
                "-lc",
                "git rev-parse --short=12 HEAD 2>/dev/null || echo unknown",
            ])
        });
    let rustc = cmd_out(&["rustc", "--version"]);
    println!("cargo:rustc-env=PDX_GIT_SHA={git}");
    println!("cargo:rustc-env=PDX_RUSTC={rustc}");
    println!("cargo:rerun-if-env-changed=PDX_GIT_SHA");
}
