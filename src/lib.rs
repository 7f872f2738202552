//! # Custodia (Student Document Vault)
//!
//! `custodia` stores categorized documents for registered users and gates
//! downloads of secure documents behind a step-up authentication flow:
//! password re-entry, then a one-time code delivered out-of-band over email
//! and SMS.
//!
//! ## Step-up flow
//!
//! A session only identifies the caller. Before a secure download the caller
//! must prove the password again (`POST /v1/stepup/request`), receive a
//! 6-digit code on at least one delivery channel, and redeem it once
//! (`POST /v1/stepup/verify`). Redemption mints a short-lived signed
//! download token bound to a single document id; the download endpoint
//! verifies signature, expiry, and document id before streaming bytes.
//!
//! ## Delivery channels
//!
//! Email and SMS are independent, unreliable, non-transactional side
//! effects. Both sends are dispatched concurrently; one successful channel
//! is enough for the request to succeed. An unconfigured provider is a
//! deterministic per-channel failure, so the service runs in degraded
//! single-channel or zero-channel mode without crashing.
//!
//! ## Security posture
//!
//! - Unknown account and wrong password are indistinguishable to callers.
//! - Wrong code and expired code are indistinguishable to callers.
//! - Code verification is locked out after repeated failures per account.
//! - Session tokens and codes are only ever compared against stored state;
//!   session tokens are stored hashed.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
