//! Dual-channel one-time-code delivery.
//!
//! A code is pushed to the account holder over two independent out-of-band
//! channels, email and SMS. The two sends are dispatched concurrently and
//! neither is retried; each is bounded by a per-channel timeout, and a
//! timeout counts as that channel's failure. One successful channel is
//! enough for the overall attempt to succeed.

pub mod email;
pub mod sms;

pub use email::EmailBackend;
pub use sms::SmsBackend;

use std::time::Duration;
use tokio::time::timeout;
use tracing::warn;

const DEFAULT_CHANNEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Classification of one dual-channel send attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Both channels delivered.
    Full,
    /// Exactly one channel delivered; the caller proceeds.
    Degraded,
    /// Neither channel delivered; the whole attempt failed.
    Failed,
}

/// Per-channel results of one send attempt. Ephemeral, never persisted.
#[derive(Clone, Copy, Debug)]
pub struct DeliveryReport {
    pub email_ok: bool,
    pub sms_ok: bool,
}

impl DeliveryReport {
    #[must_use]
    pub fn outcome(&self) -> DeliveryOutcome {
        match (self.email_ok, self.sms_ok) {
            (true, true) => DeliveryOutcome::Full,
            (false, false) => DeliveryOutcome::Failed,
            _ => DeliveryOutcome::Degraded,
        }
    }

    /// Human-readable summary naming the failing channel, if any.
    #[must_use]
    pub fn summary(&self) -> String {
        match (self.email_ok, self.sms_ok) {
            (true, true) => "Code sent by email and SMS".to_string(),
            (true, false) => "Code sent by email (SMS delivery failed)".to_string(),
            (false, true) => "Code sent by SMS (email delivery failed)".to_string(),
            (false, false) => "Unable to deliver the code on any channel".to_string(),
        }
    }
}

/// Delivery gateway holding both channel backends.
pub struct Gateway {
    email: EmailBackend,
    sms: SmsBackend,
    channel_timeout: Duration,
}

impl Gateway {
    #[must_use]
    pub fn new(email: EmailBackend, sms: SmsBackend) -> Self {
        Self {
            email,
            sms,
            channel_timeout: DEFAULT_CHANNEL_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_channel_timeout(mut self, channel_timeout: Duration) -> Self {
        self.channel_timeout = channel_timeout;
        self
    }

    /// Send `code` over both channels concurrently and classify the result.
    ///
    /// Channel failures are recovered locally: they only surface in the
    /// report, never as an error from this method.
    pub async fn send_both(
        &self,
        email_address: &str,
        phone: &str,
        code: &str,
        validity_minutes: i64,
    ) -> DeliveryReport {
        let email_send = timeout(
            self.channel_timeout,
            self.email.send(email_address, code, validity_minutes),
        );
        let sms_send = timeout(
            self.channel_timeout,
            self.sms.send(phone, code, validity_minutes),
        );

        let (email_result, sms_result) = tokio::join!(email_send, sms_send);

        let email_ok = match email_result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!("email delivery failed: {err}");
                false
            }
            Err(_) => {
                warn!("email delivery timed out");
                false
            }
        };
        let sms_ok = match sms_result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!("sms delivery failed: {err}");
                false
            }
            Err(_) => {
                warn!("sms delivery timed out");
                false
            }
        };

        DeliveryReport { email_ok, sms_ok }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_classification() {
        let full = DeliveryReport {
            email_ok: true,
            sms_ok: true,
        };
        let degraded = DeliveryReport {
            email_ok: true,
            sms_ok: false,
        };
        let failed = DeliveryReport {
            email_ok: false,
            sms_ok: false,
        };
        assert_eq!(full.outcome(), DeliveryOutcome::Full);
        assert_eq!(degraded.outcome(), DeliveryOutcome::Degraded);
        assert_eq!(failed.outcome(), DeliveryOutcome::Failed);
    }

    #[test]
    fn summary_names_failing_channel() {
        let report = DeliveryReport {
            email_ok: true,
            sms_ok: false,
        };
        assert!(report.summary().contains("SMS delivery failed"));
        let report = DeliveryReport {
            email_ok: false,
            sms_ok: true,
        };
        assert!(report.summary().contains("email delivery failed"));
    }

    #[tokio::test]
    async fn both_log_channels_succeed() {
        let gateway = Gateway::new(EmailBackend::Log, SmsBackend::Log);
        let report = gateway
            .send_both("a@x.com", "+15551230000", "123456", 5)
            .await;
        assert_eq!(report.outcome(), DeliveryOutcome::Full);
    }

    #[tokio::test]
    async fn one_unconfigured_channel_is_degraded() {
        let gateway = Gateway::new(EmailBackend::Log, SmsBackend::Unconfigured);
        let report = gateway
            .send_both("a@x.com", "+15551230000", "123456", 5)
            .await;
        assert_eq!(report.outcome(), DeliveryOutcome::Degraded);
        assert!(report.email_ok);
        assert!(!report.sms_ok);
    }

    #[tokio::test]
    async fn zero_configured_channels_fail() {
        let gateway = Gateway::new(EmailBackend::Unconfigured, SmsBackend::Unconfigured);
        let report = gateway
            .send_both("a@x.com", "+15551230000", "123456", 5)
            .await;
        assert_eq!(report.outcome(), DeliveryOutcome::Failed);
    }
}
