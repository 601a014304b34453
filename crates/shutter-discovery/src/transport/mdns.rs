//! DNS-SD transport for PTP/IP cameras
//!
//! Cameras speaking Picture Transfer Protocol over IP advertise themselves
//! as `_ptp._tcp` instances. This transport keeps one continuous browse per
//! configured service type; resolved instances land in a concurrent
//! registry that [`MdnsTransport::enumerate`] snapshots on every scan
//! cycle.

use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::transport::{DeviceRecord, Transport};
use dashmap::DashMap;
use mdns_sd::{ServiceDaemon, ServiceEvent as MdnsEvent, ServiceInfo};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, warn};

/// Transport backed by an mDNS/DNS-SD browser
pub struct MdnsTransport {
    /// mDNS service daemon
    mdns: ServiceDaemon,

    /// Registry of currently visible devices (keyed by full service name)
    registry: Arc<DashMap<String, DeviceRecord>>,
}

impl MdnsTransport {
    /// Creates the daemon and starts one browse per configured service type.
    ///
    /// Browse events are pumped on background threads that exit when the
    /// daemon shuts down (their receive channels close).
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let mdns = ServiceDaemon::new()
            .map_err(|e| DiscoveryError::MdnsInitFailed(e.to_string()))?;

        let registry: Arc<DashMap<String, DeviceRecord>> = Arc::new(DashMap::new());

        for service_type in &config.service_types {
            let service_string = service_type.to_service_string();

            debug!(
                service_type = service_string,
                description = service_type.description(),
                "Starting browser"
            );

            let receiver =
                mdns.browse(&service_string)
                    .map_err(|e| DiscoveryError::BrowseFailed {
                        service_type: service_string.clone(),
                        reason: e.to_string(),
                    })?;

            let registry = registry.clone();
            thread::Builder::new()
                .name(format!("mdns-browse-{}", service_string))
                .spawn(move || {
                    loop {
                        match receiver.recv() {
                            Ok(event) => handle_mdns_event(event, &service_string, &registry),
                            Err(_) => break,
                        }
                    }
                    debug!("Browser thread for {} stopped", service_string);
                })
                .map_err(|e| DiscoveryError::Internal(format!(
                    "Failed to spawn browse thread: {}",
                    e
                )))?;
        }

        Ok(Self { mdns, registry })
    }
}

impl Transport for MdnsTransport {
    fn enumerate(&mut self) -> Result<Vec<DeviceRecord>> {
        Ok(self
            .registry
            .iter()
            .map(|entry| entry.value().clone())
            .collect())
    }
}

impl Drop for MdnsTransport {
    fn drop(&mut self) {
        if let Err(e) = self.mdns.shutdown() {
            error!(error = %e, "Failed to shut down mDNS daemon");
        }
    }
}

/// Handles one browse event against the registry
fn handle_mdns_event(
    event: MdnsEvent,
    service_string: &str,
    registry: &DashMap<String, DeviceRecord>,
) {
    match event {
        MdnsEvent::ServiceResolved(info) => {
            debug!(
                service = info.get_fullname(),
                hostname = info.get_hostname(),
                port = info.get_port(),
                "Service resolved"
            );

            let record = convert_service_info(&info, service_string);
            registry.insert(record.id.clone(), record);
        }

        MdnsEvent::ServiceRemoved(typ, fullname) => {
            debug!(service = fullname, typ = typ, "Service removed");
            registry.remove(&fullname);
        }

        MdnsEvent::SearchStarted(typ) => {
            debug!(typ = typ, "Search started");
        }

        MdnsEvent::SearchStopped(typ) => {
            warn!(typ = typ, "Search stopped");
        }

        _ => {}
    }
}

/// Converts ServiceInfo from mdns-sd to a DeviceRecord
fn convert_service_info(info: &ServiceInfo, service_string: &str) -> DeviceRecord {
    // Prefer an IPv4 address; fall back to the advertised hostname
    let host = info
        .get_addresses()
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| info.get_addresses().iter().next())
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| info.get_hostname().trim_end_matches('.').to_string());

    DeviceRecord {
        id: info.get_fullname().to_string(),
        name: instance_name(info.get_fullname(), service_string),
        host,
    }
}

/// Extracts the instance portion of a full service name
fn instance_name(fullname: &str, service_string: &str) -> String {
    fullname
        .strip_suffix(service_string)
        .map(|s| s.trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .unwrap_or(fullname)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_name_extraction() {
        assert_eq!(
            instance_name("EOS R5._ptp._tcp.local.", "_ptp._tcp.local."),
            "EOS R5"
        );
        // Name that does not match the browsed type is passed through
        assert_eq!(
            instance_name("weird-name", "_ptp._tcp.local."),
            "weird-name"
        );
    }
}
