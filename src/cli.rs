use crate::filter::FilterState;
use clap::Parser;
use std::time::Duration;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "tfjb", version = VERSION, about = "Terminal browser for tfjournal runs")]
pub struct Cli {
    /// Base URL of the tfjournal server
    #[arg(short, long, env = "TFJOURNAL_URL", default_value = "http://localhost:8080")]
    pub url: String,

    /// Only show runs with this status
    #[arg(short, long, value_parser = ["success", "failed", "running", "canceled"])]
    pub status: Option<String>,

    /// Only show runs newer than this (e.g. 1h, 24h, 7d)
    #[arg(long, value_parser = parse_since)]
    pub since: Option<String>,

    /// Only show runs of this program
    #[arg(short, long, value_parser = ["terraform", "tofu"])]
    pub program: Option<String>,

    /// Only show runs recorded on this git branch
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Only show runs that changed resources
    #[arg(long)]
    pub has_changes: bool,

    /// Maximum number of runs to fetch
    #[arg(short, long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: u32,

    /// Reload the run list every N seconds (0 disables)
    #[arg(short, long, default_value_t = 0)]
    pub refresh: u64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Enable verbose logging to $XDG_STATE_HOME/tfjb/debug.log
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn filter_state(&self) -> FilterState {
        FilterState {
            status: self.status.clone().unwrap_or_default(),
            since: self.since.clone().unwrap_or_default(),
            program: self.program.clone().unwrap_or_default(),
            branch: self.branch.clone().unwrap_or_default(),
            has_changes: self.has_changes,
            limit: self.limit,
        }
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh > 0).then(|| Duration::from_secs(self.refresh))
    }
}

/// Accepts what the server understands: `<n>d`, or a run of `<n><unit>`
/// pairs with unit `s`, `m` or `h` (`90m`, `1h30m`).
pub fn parse_since(value: &str) -> Result<String, String> {
    let invalid = || format!("Invalid duration '{value}'. Expected e.g. 30m, 24h or 7d.");
    if let Some(days) = value.strip_suffix('d') {
        return if !days.is_empty() && days.bytes().all(|b| b.is_ascii_digit()) {
            Ok(value.to_string())
        } else {
            Err(invalid())
        };
    }
    let mut digits = 0;
    let mut pairs = 0;
    for c in value.chars() {
        match c {
            '0'..='9' => digits += 1,
            's' | 'm' | 'h' if digits > 0 => {
                digits = 0;
                pairs += 1;
            }
            _ => return Err(invalid()),
        }
    }
    if pairs == 0 || digits > 0 {
        return Err(invalid());
    }
    Ok(value.to_string())
}
