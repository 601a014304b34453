//! Borrowed byte views handed across the FFI boundary

/// A borrowed, non-owning view over a byte buffer.
///
/// The view is only valid while its producer keeps the underlying buffer
/// alive — for device accessors that is until `shutter_device_release`.
/// The bytes are never NUL-terminated; consumers copy out of the view
/// before the owning handle is released.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct RustByteSlice {
    pub bytes: *const u8,
    pub len: usize,
}

impl RustByteSlice {
    /// Borrows the bytes of a string slice
    pub fn from_str(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }

    /// Borrows a byte slice
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.as_ptr(),
            len: bytes.len(),
        }
    }
}
