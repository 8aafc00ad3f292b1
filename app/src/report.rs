//! Human-facing colored output: tables and summaries.
//!
//! Tracing handles diagnostics; this module is the product surface the
//! user actually reads, so it writes to stdout directly.

use owo_colors::OwoColorize;
use pdx_store::{ConfigRow, ProfileRow};
use pdx_types::PingResult;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct ConfigLine {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Proto")]
    protocol: String,
    #[tabled(rename = "Endpoint")]
    endpoint: String,
    #[tabled(rename = "Transport")]
    transport: String,
    #[tabled(rename = "Security")]
    security: String,
    #[tabled(rename = "Ping")]
    ping: String,
    #[tabled(rename = "Alive")]
    alive: String,
}

pub fn print_config_table(rows: &[ConfigRow]) {
    if rows.is_empty() {
        println!("  No configs stored. Add some with `proxydex add` or `proxydex sync`.");
        return;
    }

    let lines = rows.iter().map(|row| ConfigLine {
        id: row.id,
        name: truncate(&row.name, 28),
        protocol: row.protocol.to_string(),
        endpoint: format!("{}:{}", row.server, row.port),
        transport: row.transport.to_string(),
        security: row.security.to_string(),
        ping: if row.last_ping < 0 {
            "—".to_string()
        } else {
            format!("{} ms", row.last_ping)
        },
        alive: if row.is_alive { "✓".to_string() } else { "✗".to_string() },
    });

    println!("{}", Table::new(lines).with(Style::rounded()));
}

#[derive(Tabled)]
struct ProfileLine {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    profile_type: String,
    #[tabled(rename = "Configs")]
    configs: i64,
    #[tabled(rename = "Alive")]
    alive: i64,
    #[tabled(rename = "Last synced")]
    last_synced: String,
}

pub fn print_profile_table(profiles: &[ProfileRow]) {
    if profiles.is_empty() {
        println!("  No profiles yet.");
        return;
    }

    let lines = profiles.iter().map(|p| ProfileLine {
        id: p.id,
        name: truncate(&p.name, 28),
        profile_type: p.profile_type.to_string(),
        configs: p.config_count,
        alive: p.alive_count,
        last_synced: p.last_synced_at.clone().unwrap_or_else(|| "never".to_string()),
    });

    println!("{}", Table::new(lines).with(Style::rounded()));
}

/// Ingestion summary: what came in, what was new, what the database holds.
pub fn print_sync_report(source: &str, fetched: usize, inserted: usize, total_in_db: i64) {
    let skipped = fetched.saturating_sub(inserted);
    println!();
    println!("  {}", "Sync".cyan().bold());
    println!("  source      : {}", truncate(source, 56));
    println!("  fetched     : {fetched}");
    println!(
        "  inserted    : {inserted}  ({} duplicate(s) skipped)",
        skipped
    );
    println!("  total in db : {total_in_db}");
}

/// Per-endpoint probe lines plus an aggregate footer.
pub fn print_test_summary(entries: &[(ConfigRow, PingResult)]) {
    if entries.is_empty() {
        return;
    }

    let line = "═".repeat(64);
    println!();
    println!("  {line}");
    println!("   Test summary ({} config(s))", entries.len());
    println!("  {line}");

    let mut reachable = 0usize;
    let mut best: Option<i64> = None;
    let mut worst: i64 = 0;

    for (i, (row, result)) in entries.iter().enumerate() {
        let name = truncate(&row.name, 24);
        let endpoint = format!("{}:{}", row.server, row.port);

        if result.reachable {
            reachable += 1;
            best = Some(best.map_or(result.avg_ms, |b| b.min(result.avg_ms)));
            worst = worst.max(result.avg_ms);

            let mut detail = format!("{:>4} ms  loss {:>3}%", result.avg_ms, result.loss_percent);
            if let Some(score) = result.stability {
                detail.push_str(&format!("  stability {score:.2}"));
            }
            println!(
                "   #{:<3} {}  {:<26} {}  {:<6} {}",
                i + 1,
                "✓".green().bold(),
                name,
                detail,
                row.protocol.to_string(),
                endpoint
            );
        } else {
            let reason = result
                .failure_tag
                .map(|t| t.to_string())
                .unwrap_or_else(|| "—".to_string());
            println!(
                "   #{:<3} {}  {:<26} {:<22} {:<6} {}",
                i + 1,
                "✗".red().bold(),
                name,
                reason.red().to_string(),
                row.protocol.to_string(),
                endpoint
            );
        }
    }

    println!("  {line}");
    print!("   Reachable: {reachable}/{}", entries.len());
    if let Some(best) = best {
        print!("  |  Best: {best} ms  |  Worst: {worst} ms");
    }
    println!();
    println!("  {line}");
    println!();
}

fn truncate(s: &str, n: usize) -> String {
    let mut chars = s.chars();
    let taken: String = chars.by_ref().take(n).collect();
    if chars.next().is_some() {
        format!("{}…", taken.chars().take(n.saturating_sub(1)).collect::<String>())
    } else {
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings_and_marks_long_ones() {
        assert_eq!(truncate("short", 10), "short");
        let long = truncate("a-rather-long-config-name", 10);
        assert_eq!(long.chars().count(), 10);
        assert!(long.ends_with('…'));
    }
}
