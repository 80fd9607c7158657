//! Global error type for the SlingOS core.
//!
//! Competition robots cannot afford to halt, so almost nothing in this
//! workspace propagates an error upward: hardware faults are logged and
//! absorbed where they occur, invalid configuration updates are
//! rejected as no-ops, and forced command termination is ordinary
//! control flow rather than a failure.  [`SlingError`] exists for the
//! few genuinely fallible seams (HAL calls, config file I/O).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type spanning hardware failures, configuration misuse, and
/// messaging plumbing.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SlingError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Configuration Rejected: {0}")]
    ConfigRejected(String),

    #[error("Config I/O Error: {0}")]
    ConfigIo(String),

    #[error("Channel Error: {0}")]
    Channel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hardware_fault_display_names_component() {
        let err = SlingError::HardwareFault {
            component: "cata_motors".to_string(),
            details: "overcurrent".to_string(),
        };
        assert!(err.to_string().contains("cata_motors"));
        assert!(err.to_string().contains("overcurrent"));
    }

    #[test]
    fn config_rejected_display() {
        let err = SlingError::ConfigRejected("ready angle equals fire angle".to_string());
        assert!(err.to_string().contains("Configuration Rejected"));
    }

    #[test]
    fn error_serialization_roundtrip() {
        let err = SlingError::Channel("mailbox closed".to_string());
        let json = serde_json::to_string(&err).unwrap();
        let back: SlingError = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, SlingError::Channel(s) if s == "mailbox closed"));
    }
}
