//! Command-line options.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::types::{ChaseConfig, LogFormat, LogLevel};

/// Follow a URL through its redirects and report every hop.
#[derive(Debug, Clone, Parser)]
#[command(name = "chaselink", version, about)]
pub struct Cli {
    /// URL to start from
    pub url: String,

    /// Limit number of requests (0 keeps the default of 10)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Timeout for all requests together, in seconds (0 = none)
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,

    /// User-Agent header sent on every hop
    #[arg(long, default_value = "")]
    pub useragent: String,

    /// Print no progress
    #[arg(long)]
    pub silent: bool,

    /// Output file for JSON details ("-" for stdout)
    #[arg(long)]
    pub details: Option<PathBuf>,

    /// Output file for the final page body ("-" for stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Builds the chase configuration from the parsed flags.
    ///
    /// A zero `--limit` keeps the library default, matching the flag's
    /// "only set when positive" behaviour.
    pub fn chase_config(&self) -> ChaseConfig {
        let mut config = ChaseConfig::default()
            .with_timeout(Duration::from_secs(self.timeout))
            .with_user_agent(self.useragent.clone());
        if self.limit > 0 {
            config = config.with_limit(self.limit);
        }
        config
    }
}
