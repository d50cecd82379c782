//! Utility module for mediabridge
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with custom error types
//! - Configuration management
//! - Signal/connection plumbing for callbacks
//! - Common helper functions

pub mod config;
pub mod error;
pub mod signal;

// Re-export commonly used items
pub use config::{Config, GeneralConfig, PlaybackConfig};
pub use error::{AdapterError, Result};
pub use signal::{Connection, Signal};

/// Initialize the configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Format a duration for display
///
/// Formatted string in the format "HH:MM:SS" or "MM:SS" for durations under an hour
pub fn format_duration(duration: std::time::Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Ratio of two durations, 0 when the result is not finite
pub fn duration_ratio(part: std::time::Duration, whole: std::time::Duration) -> f64 {
    let ratio = part.as_secs_f64() / whole.as_secs_f64();
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}
