//! One-time code generation.

use rand::Rng;
use rand::rngs::OsRng;

/// Purpose tag recorded with every download step-up code.
pub const DOWNLOAD_PURPOSE: &str = "document download";

/// Code validity window in seconds.
pub const CODE_TTL_SECONDS: i64 = 5 * 60;

/// Generate a uniformly random 6-digit code.
///
/// Collisions with outstanding codes are acceptable: a code is only ever
/// compared together with its account and purpose, never globally.
#[must_use]
pub fn generate_code() -> String {
    let value: u32 = OsRng.gen_range(100_000..=999_999);
    value.to_string()
}
