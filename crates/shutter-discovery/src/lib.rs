//! Background discovery of PTP/IP imaging devices
//!
//! This crate provides the discovery engine used by the `shutter` FFI
//! library:
//! - Browse the local network for cameras advertising via DNS-SD
//! - Announce each newly observed device to a caller-supplied observer
//! - Drive the whole thing from a dedicated scan thread with a small
//!   start/stop/poke lifecycle
//!
//! # Architecture
//!
//! A [`DiscoveryEngine`] owns one background scan thread. Each cycle the
//! thread asks its [`Transport`] for the devices currently visible, diffs
//! the result against the set of transport identifiers it already announced,
//! and invokes the installed [`DiscoveryObserver`] once per new device.
//! `poke()` forces an immediate extra cycle; `stop()` signals the thread and
//! joins it before returning, so no callback ever outlives `stop()`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use shutter_discovery::{Device, DiscoveryConfig, DiscoveryEngine, DiscoveryObserver};
//!
//! struct Printer;
//!
//! impl DiscoveryObserver for Printer {
//!     fn device_discovered(&self, device: Arc<Device>) {
//!         println!("found {} at {}", device.name(), device.host());
//!     }
//! }
//!
//! let engine = DiscoveryEngine::with_mdns(DiscoveryConfig::default());
//! engine.start(Arc::new(Printer)).unwrap();
//! // ... later
//! engine.stop();
//! ```

pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod transport;

pub use config::{DiscoveryConfig, ServiceType};
pub use device::Device;
pub use engine::{DiscoveryEngine, DiscoveryEngineBuilder, DiscoveryObserver};
pub use error::{DiscoveryError, Result};
pub use transport::{DeviceRecord, Transport, TransportFactory};
