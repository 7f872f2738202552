//! Step-up and session tuning arguments.

use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_DOWNLOAD_TOKEN_KEY: &str = "download-token-key";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Session cookie TTL in seconds")
                .env("CUSTODIA_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("otc-ttl-seconds")
                .long("otc-ttl-seconds")
                .help("One-time code TTL in seconds")
                .env("CUSTODIA_OTC_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("download-token-ttl-seconds")
                .long("download-token-ttl-seconds")
                .help("Signed download token TTL in seconds")
                .env("CUSTODIA_DOWNLOAD_TOKEN_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new(ARG_DOWNLOAD_TOKEN_KEY)
                .long(ARG_DOWNLOAD_TOKEN_KEY)
                .help("HMAC key for signing download tokens")
                .env("CUSTODIA_DOWNLOAD_TOKEN_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("lockout-max-failures")
                .long("lockout-max-failures")
                .help("Failed code verifications before an account is locked out")
                .env("CUSTODIA_LOCKOUT_MAX_FAILURES")
                .default_value("5")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("lockout-window-seconds")
                .long("lockout-window-seconds")
                .help("Sliding window for the verification lockout")
                .env("CUSTODIA_LOCKOUT_WINDOW_SECONDS")
                .default_value("900")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("sweep-interval-seconds")
                .long("sweep-interval-seconds")
                .help("Interval between one-time code sweeps")
                .env("CUSTODIA_SWEEP_INTERVAL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub session_ttl_seconds: i64,
    pub otc_ttl_seconds: i64,
    pub download_token_ttl_seconds: i64,
    pub download_token_key: String,
    pub lockout_max_failures: u32,
    pub lockout_window_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl Options {
    /// Extract step-up options from parsed matches.
    ///
    /// # Errors
    /// Returns an error if the required token key is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            session_ttl_seconds: matches
                .get_one::<i64>("session-ttl-seconds")
                .copied()
                .unwrap_or(43200),
            otc_ttl_seconds: matches
                .get_one::<i64>("otc-ttl-seconds")
                .copied()
                .unwrap_or(300),
            download_token_ttl_seconds: matches
                .get_one::<i64>("download-token-ttl-seconds")
                .copied()
                .unwrap_or(600),
            download_token_key: matches
                .get_one::<String>(ARG_DOWNLOAD_TOKEN_KEY)
                .cloned()
                .context("missing required argument: --download-token-key")?,
            lockout_max_failures: matches
                .get_one::<u32>("lockout-max-failures")
                .copied()
                .unwrap_or(5),
            lockout_window_seconds: matches
                .get_one::<u64>("lockout-window-seconds")
                .copied()
                .unwrap_or(900),
            sweep_interval_seconds: matches
                .get_one::<u64>("sweep-interval-seconds")
                .copied()
                .unwrap_or(3600),
        })
    }
}
