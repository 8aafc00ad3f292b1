//! Command-line surface.

pub mod add;
pub mod export;
pub mod list;
pub mod rank;
pub mod remove;
pub mod sub;
pub mod sync;
pub mod test;
pub mod version;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use pdx_probe::ProbeConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "proxydex",
    version,
    about = "Manage, probe, and rank VPN/proxy endpoint configs"
)]
pub struct Args {
    /// Database file (default: ~/.proxydex/proxydex.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Log level filter (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest configs from a URL, file, or raw text
    Add(AddArgs),
    /// Fetch one subscription URL and store its configs
    Sync(SyncArgs),
    /// Probe stored configs and persist the results
    Test(TestArgs),
    /// Show stored configs
    List(ListArgs),
    /// Show alive configs ranked by latency
    Rank(RankArgs),
    /// Delete configs or profiles
    Remove(RemoveArgs),
    /// Emit a client-runtime config document
    Export(ExportArgs),
    /// Manage saved subscription URLs
    Sub(SubArgs),
    /// Print version and build info
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct AddArgs {
    /// Subscription URL, file path, or raw text containing share links
    pub source: String,

    /// Profile name (derived from the source when omitted)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct SyncArgs {
    /// Subscription URL
    pub url: String,
}

#[derive(ClapArgs, Debug)]
pub struct TestArgs {
    /// Test every stored config
    #[arg(long, conflicts_with_all = ["id", "profile"])]
    pub all: bool,

    /// Test a single config by id
    #[arg(long)]
    pub id: Option<i64>,

    /// Test all configs in one profile
    #[arg(long)]
    pub profile: Option<i64>,

    #[command(flatten)]
    pub probe: ProbeFlags,
}

/// Probe-engine flags shared by `test` and `sub sync`.
#[derive(ClapArgs, Debug, Clone)]
pub struct ProbeFlags {
    /// Dial attempts per config
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,

    /// Per-dial timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,

    /// Concurrent probes
    #[arg(long = "concurrent", default_value_t = 10)]
    pub concurrent: usize,

    /// Delay between attempts in milliseconds
    #[arg(long = "delay", default_value_t = 100)]
    pub delay_ms: u64,

    /// Stability window in seconds (0 disables the follow-up phase)
    #[arg(long = "stability-window", default_value_t = 0)]
    pub stability_window: u64,

    /// Tag failed results with the probable cause
    #[arg(long = "tag-reasons")]
    pub tag_reasons: bool,

    /// Re-validate suspiciously fast endpoints with a throughput check
    #[arg(long)]
    pub bandwidth: bool,

    /// Throughput floor in KiB/s for the fake-ping check
    #[arg(long = "min-bandwidth", default_value_t = 100)]
    pub min_bandwidth: u64,
}

impl ProbeFlags {
    pub fn to_config(&self) -> ProbeConfig {
        ProbeConfig {
            attempts: self.attempts,
            timeout: Duration::from_secs(self.timeout),
            concurrency: self.concurrent,
            attempt_delay: Duration::from_millis(self.delay_ms),
            stability_window: Duration::from_secs(self.stability_window),
            fake_ping_check: self.bandwidth,
            failure_tagging: self.tag_reasons,
            min_throughput_kbps: self.min_bandwidth,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// Filter by protocol (vless, vmess, ss, trojan, socks)
    #[arg(long)]
    pub protocol: Option<String>,

    /// Show one profile only
    #[arg(long)]
    pub profile: Option<i64>,

    /// List profiles instead of configs
    #[arg(long)]
    pub profiles: bool,
}

#[derive(ClapArgs, Debug)]
pub struct RankArgs {
    /// Limit the table to the first N entries
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(ClapArgs, Debug)]
pub struct RemoveArgs {
    /// Config id to delete
    #[arg(conflicts_with_all = ["profile", "all"])]
    pub id: Option<i64>,

    /// Delete a whole profile (cascades to its configs)
    #[arg(long)]
    pub profile: Option<i64>,

    /// Delete everything
    #[arg(long)]
    pub all: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ExportFormat {
    #[value(name = "sing-box")]
    SingBox,
    Xray,
}

#[derive(ClapArgs, Debug)]
pub struct ExportArgs {
    /// Profile whose configs are exported (alive-first order)
    #[arg(long)]
    pub profile: i64,

    /// Output document family
    #[arg(long, value_enum)]
    pub format: ExportFormat,

    /// Write to a file instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Include the stats API inbound (xray only)
    #[arg(long)]
    pub stats: bool,
}

#[derive(ClapArgs, Debug)]
pub struct SubArgs {
    #[command(subcommand)]
    pub command: SubCommands,
}

#[derive(Subcommand, Debug)]
pub enum SubCommands {
    /// Save a subscription URL
    Add { url: String },
    /// Show saved subscription URLs
    List,
    /// Sync one saved subscription
    Sync { url: String },
    /// Sync every saved subscription
    SyncAll,
    /// Forget a subscription URL (stored configs stay)
    Remove { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_parse() {
        let args = Args::try_parse_from([
            "proxydex",
            "test",
            "--all",
            "--attempts",
            "5",
            "--timeout",
            "2",
            "--concurrent",
            "30",
            "--delay",
            "200",
            "--stability-window",
            "30",
            "--tag-reasons",
            "--bandwidth",
            "--min-bandwidth",
            "150",
        ])
        .expect("parse");

        let Commands::Test(test) = args.command else {
            panic!("expected test subcommand");
        };
        assert!(test.all);
        let cfg = test.probe.to_config();
        assert_eq!(cfg.attempts, 5);
        assert_eq!(cfg.timeout, Duration::from_secs(2));
        assert_eq!(cfg.concurrency, 30);
        assert_eq!(cfg.attempt_delay, Duration::from_millis(200));
        assert_eq!(cfg.stability_window, Duration::from_secs(30));
        assert!(cfg.failure_tagging);
        assert!(cfg.fake_ping_check);
        assert_eq!(cfg.min_throughput_kbps, 150);
    }

    #[test]
    fn export_format_accepts_both_families() {
        for fmt in ["sing-box", "xray"] {
            let args = Args::try_parse_from([
                "proxydex", "export", "--profile", "1", "--format", fmt,
            ])
            .expect("parse");
            assert!(matches!(args.command, Commands::Export(_)));
        }
    }

    #[test]
    fn remove_rejects_conflicting_selectors() {
        assert!(Args::try_parse_from(["proxydex", "remove", "3", "--all"]).is_err());
        assert!(Args::try_parse_from(["proxydex", "remove", "--all"]).is_ok());
    }
}
