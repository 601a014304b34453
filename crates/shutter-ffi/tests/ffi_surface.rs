//! Exercises the C surface from Rust, the way a foreign embedder would:
//! raw handles, by-value observer structs, and explicit releases.

use parking_lot::Mutex;
use shutter::device::{shutter_device_host, shutter_device_name, shutter_device_release};
use shutter::discovery::{
    shutter_discovery_poke, shutter_discovery_release, shutter_discovery_start,
    shutter_discovery_stop,
};
use shutter::DeviceDiscoveryObserver;
use shutter_discovery::{
    Device, DeviceRecord, DiscoveryEngine, DiscoveryEngineBuilder, Transport,
};
use std::os::raw::c_void;
use std::slice;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

struct OneCamera;

impl Transport for OneCamera {
    fn enumerate(&mut self) -> shutter_discovery::Result<Vec<DeviceRecord>> {
        Ok(vec![DeviceRecord {
            id: "EOS R6._ptp._tcp.local.".to_string(),
            name: "EOS R6".to_string(),
            host: "192.168.1.23".to_string(),
        }])
    }
}

struct NoCamera;

impl Transport for NoCamera {
    fn enumerate(&mut self) -> shutter_discovery::Result<Vec<DeviceRecord>> {
        Ok(Vec::new())
    }
}

fn engine_handle(transport: fn() -> Box<dyn Transport>) -> *mut DiscoveryEngine {
    let engine = DiscoveryEngineBuilder::new()
        .scan_interval(Duration::from_millis(10))
        .transport_factory(Box::new(move || Ok(transport())))
        .build();
    Box::into_raw(Box::new(engine))
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn device_accessors_return_borrowed_views() {
    let device = Arc::new(Device::new(
        "Canon EOS R6".to_string(),
        "192.168.1.7".to_string(),
        "EOS R6._ptp._tcp.local.".to_string(),
    ));
    let handle = Arc::into_raw(device);

    let name = shutter_device_name(handle);
    let host = shutter_device_host(handle);

    unsafe {
        assert_eq!(slice::from_raw_parts(name.bytes, name.len), b"Canon EOS R6");
        assert_eq!(slice::from_raw_parts(host.bytes, host.len), b"192.168.1.7");
    }

    // Views stay stable while the handle is alive; re-reading returns the
    // same content.
    let name_again = shutter_device_name(handle);
    unsafe {
        assert_eq!(
            slice::from_raw_parts(name_again.bytes, name_again.len),
            b"Canon EOS R6"
        );
    }

    shutter_device_release(handle);
}

static DISCOVERED: AtomicUsize = AtomicUsize::new(0);
static DESTROYED: AtomicUsize = AtomicUsize::new(0);
static LAST_NAME: Mutex<String> = Mutex::new(String::new());

extern "C" fn on_device(user: *mut c_void, device: *const Device) {
    assert!(!user.is_null());

    let name = shutter_device_name(device);
    let bytes = unsafe { slice::from_raw_parts(name.bytes, name.len) };
    *LAST_NAME.lock() = String::from_utf8_lossy(bytes).into_owned();

    DISCOVERED.fetch_add(1, Ordering::SeqCst);

    // The notification transferred one reference; give it back.
    shutter_device_release(device);
}

extern "C" fn on_destroy(user: *mut c_void) {
    drop(unsafe { Box::from_raw(user as *mut u32) });
    DESTROYED.fetch_add(1, Ordering::SeqCst);
}

#[test]
fn discovery_round_trip_over_the_c_surface() {
    let handle = engine_handle(|| Box::new(OneCamera));

    let user = Box::into_raw(Box::new(7u32)) as *mut c_void;
    let observer = DeviceDiscoveryObserver {
        user,
        destroy_user: Some(on_destroy),
        discovered_device: Some(on_device),
    };

    shutter_discovery_start(handle, observer);

    assert!(wait_until(Duration::from_secs(2), || {
        DISCOVERED.load(Ordering::SeqCst) >= 1
    }));
    assert_eq!(*LAST_NAME.lock(), "EOS R6");

    // Poking a running engine is always allowed.
    shutter_discovery_poke(handle);

    shutter_discovery_stop(handle);
    assert_eq!(
        DESTROYED.load(Ordering::SeqCst),
        1,
        "destroy_user fires exactly once, at stop"
    );

    let announced = DISCOVERED.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(
        DISCOVERED.load(Ordering::SeqCst),
        announced,
        "no callback after stop returned"
    );

    shutter_discovery_release(handle);
    assert_eq!(DESTROYED.load(Ordering::SeqCst), 1);
}

#[test]
fn observer_with_null_callbacks_is_tolerated() {
    let handle = engine_handle(|| Box::new(OneCamera));

    let observer = DeviceDiscoveryObserver {
        user: std::ptr::null_mut(),
        destroy_user: None,
        discovered_device: None,
    };

    shutter_discovery_start(handle, observer);
    thread::sleep(Duration::from_millis(50));
    shutter_discovery_stop(handle);
    shutter_discovery_release(handle);
}

#[test]
fn stop_and_release_on_never_started_engine() {
    let handle = engine_handle(|| Box::new(NoCamera));

    shutter_discovery_stop(handle);
    shutter_discovery_poke(handle);
    shutter_discovery_release(handle);
}
