//! C accessors for discovered-device handles
//!
//! A device handle is an `Arc<Device>` turned into a raw pointer; every
//! discovered-device notification transfers exactly one reference to the
//! callee, returned via [`shutter_device_release`]. Accessors borrow from
//! the handle: the returned views stay valid until that release and no
//! longer.

use crate::slice::RustByteSlice;
use shutter_discovery::Device;
use std::sync::Arc;

/// Borrows the device display name.
///
/// Undefined behavior if `handle` has been released.
#[no_mangle]
pub extern "C" fn shutter_device_name(handle: *const Device) -> RustByteSlice {
    let device = unsafe { &*handle };
    RustByteSlice::from_str(device.name())
}

/// Borrows the host the device is reachable at.
///
/// Undefined behavior if `handle` has been released.
#[no_mangle]
pub extern "C" fn shutter_device_host(handle: *const Device) -> RustByteSlice {
    let device = unsafe { &*handle };
    RustByteSlice::from_str(device.host())
}

/// Releases one reference to the device.
///
/// The handle and any views borrowed from it are invalid afterwards.
/// Must be called exactly once per reference received.
#[no_mangle]
pub extern "C" fn shutter_device_release(handle: *const Device) {
    drop(unsafe { Arc::from_raw(handle) });
}
