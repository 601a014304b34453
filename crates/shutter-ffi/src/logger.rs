//! Process-wide log sink bridged into `tracing`
//!
//! The embedding application installs a single C callback via
//! [`shutter_set_logger`]; everything the engine emits through `tracing`
//! is formatted by a `tracing-subscriber` fmt subscriber whose writer
//! forwards complete lines to that callback. The slot is a plain atomic:
//! the write path never takes any engine lock, and if no callback is
//! installed, lines are dropped.

use std::ffi::CString;
use std::io::{self, Write};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// C log callback: receives one NUL-terminated, interior-NUL-free line
pub type LogFn = extern "C" fn(c_str: *const c_char);

/// Installed callback, stored as a pointer-width integer (0 = unset)
static LOG_FN: AtomicUsize = AtomicUsize::new(0);

/// The tracing subscriber is installed once, on the first set_logger call
static SUBSCRIBER_INIT: Once = Once::new();

/// Installs the process-wide logger.
///
/// The last installed callback wins; passing a null function pointer
/// disables logging. Safe to call from any thread at any time.
#[no_mangle]
pub extern "C" fn shutter_set_logger(log_function: Option<LogFn>) {
    let raw = match log_function {
        Some(f) => f as usize,
        None => 0,
    };
    LOG_FN.store(raw, Ordering::SeqCst);

    SUBSCRIBER_INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        // try_init: the embedder may already have a subscriber installed
        // in-process; ours simply loses in that case.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(CallbackWriter::default)
            .try_init();
    });
}

fn current_log_fn() -> Option<LogFn> {
    let raw = LOG_FN.load(Ordering::SeqCst);
    if raw == 0 {
        None
    } else {
        // Stored from a valid `extern "C" fn` pointer above.
        Some(unsafe { std::mem::transmute::<usize, LogFn>(raw) })
    }
}

/// Line-buffering writer that forwards each completed line to the slot
#[derive(Default)]
struct CallbackWriter {
    buf: Vec<u8>,
}

impl CallbackWriter {
    fn emit_complete_lines(&mut self) {
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            emit(&line[..line.len() - 1]);
        }
    }
}

impl Write for CallbackWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        self.emit_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit_complete_lines();
        Ok(())
    }
}

impl Drop for CallbackWriter {
    fn drop(&mut self) {
        self.emit_complete_lines();
        if !self.buf.is_empty() {
            let tail = std::mem::take(&mut self.buf);
            emit(&tail);
        }
    }
}

/// Hands one line to the installed callback, if any.
///
/// The callback expects a clean C string, so interior NUL bytes are
/// stripped before conversion.
fn emit(line: &[u8]) {
    let Some(log) = current_log_fn() else {
        return;
    };

    let clean: Vec<u8> = line.iter().copied().filter(|&b| b != 0).collect();
    if let Ok(c_line) = CString::new(clean) {
        log(c_line.as_ptr());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    static CAPTURED: Mutex<Vec<String>> = Mutex::new(Vec::new());

    // The logger slot is process-wide; serialize the tests that touch it.
    static SLOT_GUARD: Mutex<()> = Mutex::new(());

    extern "C" fn capture(c_str: *const c_char) {
        let line = unsafe { std::ffi::CStr::from_ptr(c_str) };
        CAPTURED.lock().push(line.to_string_lossy().into_owned());
    }

    #[test]
    fn test_lines_reach_the_installed_callback() {
        let _guard = SLOT_GUARD.lock();
        shutter_set_logger(Some(capture));

        let mut writer = CallbackWriter::default();
        writer.write_all(b"scan cycle failed: timeout\n").unwrap();

        let captured = CAPTURED.lock();
        assert!(captured
            .iter()
            .any(|line| line.contains("scan cycle failed: timeout")));
    }

    #[test]
    fn test_interior_nul_bytes_are_stripped() {
        let _guard = SLOT_GUARD.lock();
        shutter_set_logger(Some(capture));

        let mut writer = CallbackWriter::default();
        writer.write_all(b"bad\0name\n").unwrap();

        let captured = CAPTURED.lock();
        assert!(captured.iter().any(|line| line.contains("badname")));
    }

    #[test]
    fn test_null_function_disables_logging() {
        let _guard = SLOT_GUARD.lock();
        shutter_set_logger(Some(capture));
        shutter_set_logger(None);

        let before = CAPTURED.lock().len();
        let mut writer = CallbackWriter::default();
        writer.write_all(b"dropped line\n").unwrap();

        assert_eq!(CAPTURED.lock().len(), before);
        shutter_set_logger(Some(capture));
    }
}
