//! Step-up authentication for secure document downloads.
//!
//! The cycle is request (password re-verification and code dispatch),
//! verify (code redemption and token minting), and a periodic sweep of
//! spent ledger rows.

pub mod code;
pub(crate) mod download;
pub mod ledger;
pub(crate) mod lockout;
pub(crate) mod request;
pub(crate) mod types;
pub(crate) mod verify;
