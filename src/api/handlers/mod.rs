//! API handlers for Custodia.
//!
//! Route handlers are grouped by concern: account lifecycle under `auth`,
//! the document directory under `documents`, and the step-up cycle for
//! secure downloads under `stepup`.

pub mod auth;
pub mod documents;
pub mod health;
pub mod root;
pub mod stepup;
