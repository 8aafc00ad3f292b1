//! proxydex — local manager for VPN/proxy endpoint configs.
//!
//! Ingests share links and subscriptions, probes endpoints, ranks them by
//! observed quality, and emits client-runtime configs. This binary is the
//! command surface; the actual work lives in the `pdx-*` crates.

mod cli;
mod logging;
mod paths;
mod report;

use clap::Parser;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    logging::init(args.log_level.as_deref());

    if let Err(err) = run(args).await {
        eprintln!("proxydex: {err:#}");
        std::process::exit(1);
    }
}

async fn run(args: cli::Args) -> anyhow::Result<()> {
    let db_path = paths::db_path(args.db.clone())?;

    match args.command {
        cli::Commands::Add(a) => cli::add::run(&db_path, a).await,
        cli::Commands::Sync(a) => cli::sync::run(&db_path, a).await,
        cli::Commands::Test(a) => cli::test::run(&db_path, a).await,
        cli::Commands::List(a) => cli::list::run(&db_path, a),
        cli::Commands::Rank(a) => cli::rank::run(&db_path, a),
        cli::Commands::Remove(a) => cli::remove::run(&db_path, a),
        cli::Commands::Export(a) => cli::export::run(&db_path, a),
        cli::Commands::Sub(a) => cli::sub::run(&db_path, a).await,
        cli::Commands::Version => {
            cli::version::run();
            Ok(())
        }
    }
}
