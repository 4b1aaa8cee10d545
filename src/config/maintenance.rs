//! Periodic maintenance configuration

use serde::{Deserialize, Serialize};

/// Configuration for the recurring maintenance task
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Interval between maintenance ticks (seconds)
    pub interval_secs: u64,
    /// Delay before the first tick, dampened so startup work settles first (seconds)
    pub first_delay_secs: u64,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            interval_secs: 50,
            first_delay_secs: 10,
        }
    }
}
