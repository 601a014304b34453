//! C FFI surface for the Shutter discovery engine
//!
//! This crate exposes the discovery engine to foreign (no-GC) embedders as
//! a `cdylib`; the matching declarations live in `include/shutter.h`. The
//! surface is intentionally small:
//! - `shutter_set_logger` — install a process-wide log sink
//! - `shutter_discovery_new` / `_start` / `_stop` / `_poke` / `_release` —
//!   engine lifecycle
//! - `shutter_device_name` / `_host` / `_release` — device handle accessors
//!
//! # Handle contract
//!
//! All handles are opaque pointers. Pointer arguments are assumed non-null;
//! passing an already-released handle, releasing a handle twice, or using a
//! [`RustByteSlice`] after releasing the device it was borrowed from is
//! undefined behavior, not a reported error. The boundary trades runtime
//! checking for zero-overhead interop — see the header for the full rules.

pub mod device;
pub mod discovery;
pub mod logger;
pub mod slice;

pub use discovery::DeviceDiscoveryObserver;
pub use slice::RustByteSlice;
