//! Configuration loading
//!
//! The wheel configuration is compiled into the firmware from wheel.toml
//! (checked by build.rs) and parsed at boot with the no_std parser from
//! iris-core.

use defmt::*;
use iris_core::config::{parse_config, WheelConfig};

/// Embedded configuration (compiled into firmware)
/// Edit wheel.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../wheel.toml");

/// Load the embedded configuration
///
/// Falls back to compiled defaults if the embedded text is rejected.
pub fn load() -> WheelConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Loaded wheel.toml: {} slots, home slot {}, {} attempt(s) per move",
                config.slot_count, config.home_slot, config.retry.attempts
            );
            debug!("Timing: {}", config.timing);
            config
        }
        Err(e) => {
            warn!("wheel.toml rejected ({}), using defaults", e);
            WheelConfig::default()
        }
    }
}
