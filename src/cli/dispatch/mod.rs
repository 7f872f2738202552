//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{delivery, stepup};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let storage_dir = matches
        .get_one::<String>("storage-dir")
        .cloned()
        .context("missing required argument: --storage-dir")?;
    let frontend_base_url = matches
        .get_one::<String>("frontend-base-url")
        .cloned()
        .context("missing required argument: --frontend-base-url")?;

    let stepup_opts = stepup::Options::parse(matches)?;
    let delivery_opts = delivery::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        dsn,
        storage_dir,
        frontend_base_url,
        session_ttl_seconds: stepup_opts.session_ttl_seconds,
        otc_ttl_seconds: stepup_opts.otc_ttl_seconds,
        download_token_ttl_seconds: stepup_opts.download_token_ttl_seconds,
        download_token_key: stepup_opts.download_token_key,
        lockout_max_failures: stepup_opts.lockout_max_failures,
        lockout_window_seconds: stepup_opts.lockout_window_seconds,
        sweep_interval_seconds: stepup_opts.sweep_interval_seconds,
        delivery_log_stub: delivery_opts.log_stub,
        email_provider_url: delivery_opts.email_provider_url,
        email_api_key: delivery_opts.email_api_key,
        email_from: delivery_opts.email_from,
        sms_provider_url: delivery_opts.sms_provider_url,
        sms_api_key: delivery_opts.sms_api_key,
        sms_from: delivery_opts.sms_from,
        delivery_timeout_seconds: delivery_opts.timeout_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    fn matches_from(args: Vec<&str>) -> clap::ArgMatches {
        commands::new().get_matches_from(args)
    }

    #[test]
    fn handler_builds_server_action() {
        temp_env::with_vars(
            [
                ("CUSTODIA_DELIVERY_LOG_STUB", None::<&str>),
                ("CUSTODIA_EMAIL_PROVIDER_URL", None::<&str>),
            ],
            || {
                let matches = matches_from(vec![
                    "custodia",
                    "--dsn",
                    "postgres://localhost/custodia",
                    "--download-token-key",
                    "secret-key",
                    "--otc-ttl-seconds",
                    "120",
                    "--sweep-interval-seconds",
                    "60",
                ]);
                let action = handler(&matches).unwrap();
                let Action::Server(args) = action;
                assert_eq!(args.port, 8080);
                assert_eq!(args.dsn, "postgres://localhost/custodia");
                assert_eq!(args.otc_ttl_seconds, 120);
                assert_eq!(args.sweep_interval_seconds, 60);
                assert_eq!(args.download_token_key, "secret-key");
                assert!(!args.delivery_log_stub);
                assert_eq!(args.email_provider_url, None);
            },
        );
    }

    #[test]
    fn handler_picks_up_delivery_stub() {
        let matches = matches_from(vec![
            "custodia",
            "--dsn",
            "postgres://localhost/custodia",
            "--download-token-key",
            "secret-key",
            "--delivery-log-stub",
        ]);
        let Action::Server(args) = handler(&matches).unwrap();
        assert!(args.delivery_log_stub);
    }
}
