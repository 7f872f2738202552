use crate::api;
use anyhow::Result;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub storage_dir: String,
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub otc_ttl_seconds: i64,
    pub download_token_ttl_seconds: i64,
    pub download_token_key: String,
    pub lockout_max_failures: u32,
    pub lockout_window_seconds: u64,
    pub sweep_interval_seconds: u64,
    pub delivery_log_stub: bool,
    pub email_provider_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub sms_provider_url: Option<String>,
    pub sms_api_key: Option<String>,
    pub sms_from: Option<String>,
    pub delivery_timeout_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth_config = api::handlers::auth::AuthConfig::new(
        args.frontend_base_url,
        PathBuf::from(args.storage_dir),
    )
    .with_session_ttl_seconds(args.session_ttl_seconds)
    .with_otc_ttl_seconds(args.otc_ttl_seconds)
    .with_download_token_ttl_seconds(args.download_token_ttl_seconds)
    .with_lockout_max_failures(args.lockout_max_failures)
    .with_lockout_window_seconds(args.lockout_window_seconds);

    let email = api::delivery::EmailBackend::from_options(
        args.delivery_log_stub,
        args.email_provider_url,
        args.email_api_key,
        args.email_from,
    );
    let sms = api::delivery::SmsBackend::from_options(
        args.delivery_log_stub,
        args.sms_provider_url,
        args.sms_api_key,
        args.sms_from,
    );
    info!(
        email = %email.describe(),
        sms = %sms.describe(),
        "delivery channels configured"
    );

    let gateway = api::delivery::Gateway::new(email, sms)
        .with_channel_timeout(Duration::from_secs(args.delivery_timeout_seconds));

    let sweep_config =
        api::sweep::SweepConfig::new().with_interval_seconds(args.sweep_interval_seconds);

    api::new(
        args.port,
        args.dsn,
        auth_config,
        gateway,
        SecretString::from(args.download_token_key),
        sweep_config,
    )
    .await
}
