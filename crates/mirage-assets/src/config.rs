//! Transfer engine tuning knobs

use serde::{Deserialize, Serialize};

/// Timeout and retry policy for the transfer engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Seconds a texture transfer may stall before it is retried. Textures
    /// are frequent and cheap to restart, so they time out sooner.
    pub texture_timeout_secs: f64,
    /// Seconds a generic asset transfer may stall before it is retried.
    pub asset_timeout_secs: f64,
    /// Timeout retries allowed per asset before the transfer is reported as
    /// failed to every requester.
    pub max_retries: u32,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            texture_timeout_secs: 60.0,
            asset_timeout_secs: 120.0,
            max_retries: 3,
        }
    }
}
