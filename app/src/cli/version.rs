//! `proxydex version`

pub fn run() {
    println!(
        "proxydex {} (git {})",
        env!("CARGO_PKG_VERSION"),
        env!("PDX_GIT_SHA")
    );
    println!("built with {}", env!("PDX_RUSTC"));
}
