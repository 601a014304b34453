//! Discovery engine lifecycle and scan loop
//!
//! One [`DiscoveryEngine`] owns one background scan thread. The public
//! operations (`start`, `stop`, `poke`) are callable from any thread; the
//! observer only ever hears from the scan thread, one callback at a time.

use crate::config::DiscoveryConfig;
use crate::device::Device;
use crate::error::{DiscoveryError, Result};
use crate::transport::mdns::MdnsTransport;
use crate::transport::{Transport, TransportFactory};
use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Receiver of discovered-device notifications.
///
/// Installed via [`DiscoveryEngine::start`] and held as
/// `Arc<dyn DiscoveryObserver>`. The engine guarantees:
/// - callbacks are serialized (they run on the scan thread, never two at
///   once);
/// - no callback is delivered after `stop()` has returned;
/// - the observer is dropped exactly once, after any callback into it has
///   returned — for FFI observers the `Drop` impl is the `destroy_user`
///   moment.
///
/// A callback may block; that stalls scanning (and a concurrent `stop()`)
/// until it returns.
pub trait DiscoveryObserver: Send + Sync {
    /// Called once per newly discovered device, on the scan thread
    fn device_discovered(&self, device: Arc<Device>);
}

/// Scan thread control flags, guarded by one mutex and woken via Condvar
#[derive(Default)]
struct Control {
    /// Cooperative cancellation; checked between transport operations
    stop: bool,
    /// Out-of-band rescan request; coalesces until the next cycle clears it
    poke: bool,
}

/// State shared between the engine handle and its scan thread
struct Shared {
    control: Mutex<Control>,
    wake: Condvar,
    /// Currently installed observer. Dispatch clones the Arc and releases
    /// the lock before invoking the callback, so a swap during an in-flight
    /// callback only defers the old observer's destruction until the
    /// callback returns.
    observer: Mutex<Option<Arc<dyn DiscoveryObserver>>>,
}

/// The device discovery engine.
///
/// Lifecycle: `Idle` after construction; `start` installs an observer and
/// spawns the scan thread; `stop` joins it and discards the observer;
/// dropping the engine performs an implicit `stop`.
///
/// Calling `stop` (or dropping the engine) from inside a discovery callback
/// deadlocks: `stop` joins the scan thread the callback is running on.
/// `start` and `poke` are safe from inside a callback.
pub struct DiscoveryEngine {
    config: DiscoveryConfig,
    transport_factory: TransportFactory,
    shared: Arc<Shared>,
    /// Join handle of the scan thread; also serializes start/stop
    worker: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
}

impl DiscoveryEngine {
    /// Creates an idle engine with an explicit transport factory.
    ///
    /// Never fails: transport setup is deferred into `start`.
    pub fn new(config: DiscoveryConfig, transport_factory: TransportFactory) -> Self {
        Self {
            config,
            transport_factory,
            shared: Arc::new(Shared {
                control: Mutex::new(Control::default()),
                wake: Condvar::new(),
                observer: Mutex::new(None),
            }),
            worker: Mutex::new(None),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates an idle engine backed by the DNS-SD transport
    pub fn with_mdns(config: DiscoveryConfig) -> Self {
        let transport_config = config.clone();
        Self::new(
            config,
            Box::new(move || {
                let transport: Box<dyn Transport> =
                    Box::new(MdnsTransport::new(&transport_config)?);
                Ok(transport)
            }),
        )
    }

    /// Starts scanning with the given observer.
    ///
    /// If the engine is already running, the observer is replaced
    /// atomically and scanning continues; the superseded observer is
    /// dropped once no in-flight callback still holds it. If the engine is
    /// idle, the scan thread is spawned; transport setup failures are
    /// returned here (and only here).
    pub fn start(&self, observer: Arc<dyn DiscoveryObserver>) -> Result<()> {
        let mut worker = self.worker.lock();

        let previous = self.shared.observer.lock().replace(observer);
        let replaced = previous.is_some();
        drop(previous);

        let mut spawned = false;
        if worker.is_none() {
            self.config
                .validate()
                .map_err(DiscoveryError::InvalidConfig)?;

            let transport = (self.transport_factory)()?;

            *self.shared.control.lock() = Control::default();
            self.running.store(true, Ordering::SeqCst);

            let shared = self.shared.clone();
            let config = self.config.clone();
            let running = self.running.clone();

            let handle = thread::Builder::new()
                .name("shutter-scan".to_string())
                .spawn(move || scan_loop(shared, transport, config, running))
                .map_err(|e| {
                    self.running.store(false, Ordering::SeqCst);
                    DiscoveryError::Internal(format!("Failed to spawn scan thread: {}", e))
                })?;

            *worker = Some(handle);
            spawned = true;
        }

        // Logging happens outside the lifecycle lock: the log sink is
        // caller code and must never observe an engine lock held.
        drop(worker);
        if replaced {
            debug!("Replacing active observer");
        }
        if spawned {
            info!("Discovery engine started");
        }

        Ok(())
    }

    /// Halts scanning and blocks until the scan thread has fully quiesced.
    ///
    /// No discovered-device callback is delivered after this returns. The
    /// installed observer is discarded (its drop is the `destroy_user`
    /// moment). Idempotent: a no-op on an idle engine.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();

        let mut stopped = false;
        let mut panicked = false;
        if let Some(handle) = worker.take() {
            self.shared.control.lock().stop = true;
            self.shared.wake.notify_all();

            panicked = handle.join().is_err();
            stopped = true;
        }

        // A failed start can leave an observer installed on an idle
        // engine; discard it here so it is dropped exactly once.
        let previous = self.shared.observer.lock().take();

        drop(worker);
        drop(previous);

        if panicked {
            error!("Scan thread panicked");
        }
        if stopped {
            info!("Discovery engine stopped");
        }
    }

    /// Requests an immediate rescan cycle.
    ///
    /// Multiple pokes while a scan is pending coalesce into one extra
    /// cycle. A no-op when the engine is idle.
    pub fn poke(&self) {
        {
            let mut control = self.shared.control.lock();
            if control.stop {
                return;
            }
            control.poke = true;
        }
        self.shared.wake.notify_all();
    }

    /// Returns whether the scan thread is currently active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for DiscoveryEngine {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("Discovery engine dropped while still running");
        }
        self.stop();
    }
}

/// Builder for DiscoveryEngine
pub struct DiscoveryEngineBuilder {
    config: DiscoveryConfig,
    transport_factory: Option<TransportFactory>,
}

impl Default for DiscoveryEngineBuilder {
    fn default() -> Self {
        Self {
            config: DiscoveryConfig::default(),
            transport_factory: None,
        }
    }
}

impl DiscoveryEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full configuration
    pub fn config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the scan interval
    pub fn scan_interval(mut self, interval: Duration) -> Self {
        self.config.scan_interval_ms = interval.as_millis() as u64;
        self
    }

    /// Use a custom transport instead of DNS-SD
    pub fn transport_factory(mut self, factory: TransportFactory) -> Self {
        self.transport_factory = Some(factory);
        self
    }

    /// Build the engine
    pub fn build(self) -> DiscoveryEngine {
        match self.transport_factory {
            Some(factory) => DiscoveryEngine::new(self.config, factory),
            None => DiscoveryEngine::with_mdns(self.config),
        }
    }
}

/// The scan thread body: enumerate, diff, announce, wait, repeat
fn scan_loop(
    shared: Arc<Shared>,
    mut transport: Box<dyn Transport>,
    config: DiscoveryConfig,
    running: Arc<AtomicBool>,
) {
    debug!(interval_ms = config.scan_interval_ms, "Scan loop started");

    let mut known: HashSet<String> = HashSet::new();

    loop {
        if shared.control.lock().stop {
            break;
        }

        if config.enabled {
            scan_cycle(&shared, transport.as_mut(), &mut known);
        }

        let mut control = shared.control.lock();
        if control.stop {
            break;
        }
        if !control.poke {
            let _ = shared.wake.wait_for(&mut control, config.scan_interval());
        }
        if control.stop {
            break;
        }
        control.poke = false;
    }

    running.store(false, Ordering::SeqCst);
    debug!("Scan loop stopped");
}

/// One enumeration pass: announce devices not seen on the previous pass.
///
/// A device that vanishes is forgotten, so it is announced again if it
/// reappears in a later cycle. Enumeration failures are transient: logged
/// and retried on the next cycle.
fn scan_cycle(shared: &Shared, transport: &mut dyn Transport, known: &mut HashSet<String>) {
    let records = match transport.enumerate() {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Device enumeration failed, retrying next cycle");
            return;
        }
    };

    let current: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();

    for record in records {
        if known.contains(&record.id) {
            continue;
        }
        if shared.control.lock().stop {
            return;
        }
        let device = Arc::new(Device::new(record.name, record.host, record.id));
        announce(shared, device);
    }

    for id in known.difference(&current) {
        debug!(device = %id, "Device no longer visible");
    }

    *known = current;
}

/// Delivers one device to the installed observer, if any.
///
/// The observer lock is released before the callback runs; a panicking
/// observer is contained here so an unrelated callback fault never kills
/// discovery.
fn announce(shared: &Shared, device: Arc<Device>) {
    let observer = shared.observer.lock().clone();
    let Some(observer) = observer else {
        return;
    };

    info!(
        name = device.name(),
        host = device.host(),
        "Device discovered"
    );

    if catch_unwind(AssertUnwindSafe(|| observer.device_discovered(device))).is_err() {
        error!("Observer callback panicked, continuing discovery");
    }
}
