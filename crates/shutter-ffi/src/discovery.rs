//! C lifecycle surface for the discovery engine
//!
//! Engine handles are boxed [`DiscoveryEngine`]s. The observer comes in as
//! a plain struct of C function pointers plus an opaque context; it is
//! wrapped in an adapter whose `Drop` is the one place `destroy_user`
//! fires, so the exactly-once guarantee falls out of Rust ownership.

use shutter_discovery::{Device, DiscoveryConfig, DiscoveryEngine, DiscoveryObserver};
use std::os::raw::c_void;
use std::sync::Arc;
use tracing::error;

/// Caller-supplied observer, by value, matching `device_discovery_observer`
/// in the C header. Null function pointers are tolerated (the notification
/// or destruction step is skipped).
#[repr(C)]
pub struct DeviceDiscoveryObserver {
    /// Opaque context passed back on every callback
    pub user: *mut c_void,
    /// Invoked exactly once when the observer is replaced or discarded
    pub destroy_user: Option<extern "C" fn(user: *mut c_void)>,
    /// Invoked once per discovered device, on the scan thread; ownership of
    /// one device reference transfers to the callee
    pub discovered_device: Option<extern "C" fn(user: *mut c_void, device: *const Device)>,
}

/// Adapter from the C observer struct to the engine's observer trait
struct FfiObserver {
    user: *mut c_void,
    destroy_user: Option<extern "C" fn(user: *mut c_void)>,
    discovered_device: Option<extern "C" fn(user: *mut c_void, device: *const Device)>,
}

// The observer contract requires `user` to be usable from the scan thread;
// the engine serializes all callbacks into it.
unsafe impl Send for FfiObserver {}
unsafe impl Sync for FfiObserver {}

impl DiscoveryObserver for FfiObserver {
    fn device_discovered(&self, device: Arc<Device>) {
        if let Some(callback) = self.discovered_device {
            // One reference transfers to the callee; it comes back through
            // shutter_device_release.
            callback(self.user, Arc::into_raw(device));
        }
    }
}

impl Drop for FfiObserver {
    fn drop(&mut self) {
        if let Some(destroy) = self.destroy_user {
            destroy(self.user);
        }
    }
}

/// Allocates a new, idle engine. Never returns null.
#[no_mangle]
pub extern "C" fn shutter_discovery_new() -> *mut DiscoveryEngine {
    Box::into_raw(Box::new(DiscoveryEngine::with_mdns(
        DiscoveryConfig::default(),
    )))
}

/// Begins scanning with the given observer, or replaces the observer of an
/// already-running engine.
///
/// The superseded observer's `destroy_user` fires once no in-flight
/// callback still holds it. Transport setup failures are logged through
/// the installed logger; the engine stays idle and a later `start` may
/// succeed.
#[no_mangle]
pub extern "C" fn shutter_discovery_start(
    handle: *mut DiscoveryEngine,
    observer: DeviceDiscoveryObserver,
) {
    let engine = unsafe { &*handle };

    let observer = Arc::new(FfiObserver {
        user: observer.user,
        destroy_user: observer.destroy_user,
        discovered_device: observer.discovered_device,
    });

    if let Err(e) = engine.start(observer) {
        error!(error = %e, "Failed to start discovery");
    }
}

/// Halts scanning. Blocks until the scan thread has quiesced; no
/// discovered-device callback is delivered after this returns.
///
/// Must not be called from inside a discovery callback (the calling thread
/// would join itself).
#[no_mangle]
pub extern "C" fn shutter_discovery_stop(handle: *mut DiscoveryEngine) {
    let engine = unsafe { &*handle };
    engine.stop();
}

/// Requests an immediate rescan cycle; coalesced, no-op while idle
#[no_mangle]
pub extern "C" fn shutter_discovery_poke(handle: *mut DiscoveryEngine) {
    let engine = unsafe { &*handle };
    engine.poke();
}

/// Stops the engine if needed and frees it. The handle is invalid
/// afterwards; releasing it twice is undefined behavior.
#[no_mangle]
pub extern "C" fn shutter_discovery_release(handle: *mut DiscoveryEngine) {
    drop(unsafe { Box::from_raw(handle) });
}
