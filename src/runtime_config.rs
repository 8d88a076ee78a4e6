//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the binder.
//!
//! ## Environment Variables
//!
//! ### `BRRTBIND_MAX_BODY_BYTES`
//!
//! Upper bound on the bytes a body decoder may read from the request payload. Accepts values in:
//! - Decimal: `1048576` (1 MiB)
//! - Hexadecimal: `0x100000` (1 MiB)
//!
//! Default: `0xA00000` (10 MiB)
//!
//! ### `BRRTBIND_ERROR_STATUS`
//!
//! Status code for requests whose path or query parameters fail to bind. Must be a 4xx code;
//! anything else falls back to the default.
//!
//! Default: `400`
//!
//! ## Usage
//!
//! ```rust
//! use brrtbind::runtime_config::BindConfig;
//!
//! let config = BindConfig::from_env();
//! println!("Max body: {} bytes", config.max_body_bytes);
//! ```

use http::StatusCode;
use std::env;

const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

/// Binder configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindConfig {
    /// Bytes of request payload visible to the body decoder (default: 10 MiB)
    pub max_body_bytes: u64,
    /// Status for aggregate binding failures (default: 400)
    pub error_status: StatusCode,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            error_status: StatusCode::BAD_REQUEST,
        }
    }
}

impl BindConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("BRRTBIND_MAX_BODY_BYTES").ok().as_deref(),
            env::var("BRRTBIND_ERROR_STATUS").ok().as_deref(),
        )
    }

    fn from_vars(max_body: Option<&str>, error_status: Option<&str>) -> Self {
        let max_body_bytes = match max_body {
            Some(val) => {
                if let Some(hex) = val.strip_prefix("0x") {
                    u64::from_str_radix(hex, 16).unwrap_or(DEFAULT_MAX_BODY_BYTES)
                } else {
                    val.parse().unwrap_or(DEFAULT_MAX_BODY_BYTES)
                }
            }
            None => DEFAULT_MAX_BODY_BYTES,
        };
        let error_status = error_status
            .and_then(|s| s.parse::<u16>().ok())
            .and_then(|code| StatusCode::from_u16(code).ok())
            .filter(StatusCode::is_client_error)
            .unwrap_or(StatusCode::BAD_REQUEST);
        BindConfig {
            max_body_bytes,
            error_status,
        }
    }
}
