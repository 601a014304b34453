//! Configuration types for the discovery engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the discovery engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Enable scanning (a disabled engine starts but never enumerates)
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often the scan loop enumerates the transport (milliseconds)
    #[serde(default = "default_scan_interval")]
    pub scan_interval_ms: u64,

    /// Service types to browse for
    #[serde(default = "default_service_types")]
    pub service_types: Vec<ServiceType>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            scan_interval_ms: default_scan_interval(),
            service_types: default_service_types(),
        }
    }
}

impl DiscoveryConfig {
    /// Returns the scan interval as a Duration
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.scan_interval_ms == 0 {
            return Err("scan_interval_ms cannot be 0".to_string());
        }

        if self.service_types.is_empty() {
            return Err("at least one service type must be configured".to_string());
        }

        Ok(())
    }
}

/// Types of services to browse for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    /// PTP/IP cameras (Canon, Nikon, Sony bodies advertising Picture
    /// Transfer Protocol over IP)
    /// Typical service: _ptp._tcp.local
    PtpIp,

    /// Custom service type
    Custom(String),
}

impl ServiceType {
    /// Returns the DNS-SD service type string
    pub fn to_service_string(&self) -> String {
        match self {
            ServiceType::PtpIp => "_ptp._tcp.local.".to_string(),
            ServiceType::Custom(s) => {
                if s.ends_with('.') {
                    s.clone()
                } else {
                    format!("{}.", s)
                }
            }
        }
    }

    /// Returns a human-readable description
    pub fn description(&self) -> &str {
        match self {
            ServiceType::PtpIp => "PTP/IP imaging device",
            ServiceType::Custom(_) => "Custom service",
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_scan_interval() -> u64 {
    2000
}

fn default_service_types() -> Vec<ServiceType> {
    vec![ServiceType::PtpIp]
}
