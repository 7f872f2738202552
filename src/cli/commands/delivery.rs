//! Delivery channel provider arguments.
//!
//! Email and SMS providers are independent optional HTTP endpoints. A
//! channel with partial or missing provider settings stays unconfigured and
//! fails deterministically; `--delivery-log-stub` turns both channels into
//! log-only stubs for local development.

use clap::{Arg, ArgAction, ArgMatches, Command};

pub const ARG_DELIVERY_LOG_STUB: &str = "delivery-log-stub";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_DELIVERY_LOG_STUB)
                .long(ARG_DELIVERY_LOG_STUB)
                .help("Log one-time codes instead of calling delivery providers")
                .env("CUSTODIA_DELIVERY_LOG_STUB")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("email-provider-url")
                .long("email-provider-url")
                .help("Email provider HTTP endpoint")
                .env("CUSTODIA_EMAIL_PROVIDER_URL"),
        )
        .arg(
            Arg::new("email-api-key")
                .long("email-api-key")
                .help("Email provider API key")
                .env("CUSTODIA_EMAIL_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("email-from")
                .long("email-from")
                .help("Sender address for one-time code emails")
                .env("CUSTODIA_EMAIL_FROM"),
        )
        .arg(
            Arg::new("sms-provider-url")
                .long("sms-provider-url")
                .help("SMS provider HTTP endpoint")
                .env("CUSTODIA_SMS_PROVIDER_URL"),
        )
        .arg(
            Arg::new("sms-api-key")
                .long("sms-api-key")
                .help("SMS provider API key")
                .env("CUSTODIA_SMS_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new("sms-from")
                .long("sms-from")
                .help("Sender id for one-time code SMS")
                .env("CUSTODIA_SMS_FROM"),
        )
        .arg(
            Arg::new("delivery-timeout-seconds")
                .long("delivery-timeout-seconds")
                .help("Per-channel delivery timeout in seconds")
                .env("CUSTODIA_DELIVERY_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[derive(Debug)]
pub struct Options {
    pub log_stub: bool,
    pub email_provider_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub sms_provider_url: Option<String>,
    pub sms_api_key: Option<String>,
    pub sms_from: Option<String>,
    pub timeout_seconds: u64,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            log_stub: matches.get_flag(ARG_DELIVERY_LOG_STUB),
            email_provider_url: matches.get_one::<String>("email-provider-url").cloned(),
            email_api_key: matches.get_one::<String>("email-api-key").cloned(),
            email_from: matches.get_one::<String>("email-from").cloned(),
            sms_provider_url: matches.get_one::<String>("sms-provider-url").cloned(),
            sms_api_key: matches.get_one::<String>("sms-api-key").cloned(),
            sms_from: matches.get_one::<String>("sms-from").cloned(),
            timeout_seconds: matches
                .get_one::<u64>("delivery-timeout-seconds")
                .copied()
                .unwrap_or(10),
        }
    }
}
