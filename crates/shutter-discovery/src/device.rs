//! Discovered device records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One discovered imaging device.
///
/// Devices are immutable after construction and shared as `Arc<Device>`:
/// the engine hands a reference to the observer for every announcement and
/// the observer keeps it alive for as long as it needs the data. All
/// accessors are read-only and safe to call concurrently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    /// Display name (e.g. "Canon EOS R5")
    name: String,

    /// Host the device is reachable at (IP address or hostname, no port)
    host: String,

    /// Transport-defined identity key; for mDNS this is the full service
    /// name. Two announcements with the same key refer to the same device
    /// within one scan epoch.
    transport_id: String,

    /// When this device was first observed
    discovered_at: DateTime<Utc>,
}

impl Device {
    /// Creates a new device record
    pub fn new(name: String, host: String, transport_id: String) -> Self {
        Self {
            name,
            host,
            transport_id,
            discovered_at: Utc::now(),
        }
    }

    /// Display name of the device
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host or address the device is reachable at
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Transport-defined identity key
    pub fn transport_id(&self) -> &str {
        &self.transport_id
    }

    /// When this device was first observed
    pub fn discovered_at(&self) -> DateTime<Utc> {
        self.discovered_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_accessors() {
        let device = Device::new(
            "Canon EOS R5".to_string(),
            "192.168.1.42".to_string(),
            "EOS R5._ptp._tcp.local.".to_string(),
        );

        assert_eq!(device.name(), "Canon EOS R5");
        assert_eq!(device.host(), "192.168.1.42");
        assert_eq!(device.transport_id(), "EOS R5._ptp._tcp.local.");
        assert!(device.discovered_at() <= Utc::now());
    }
}
