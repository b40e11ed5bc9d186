//! The global framebuffer console.
//!
//! One [`Console`] for the lifetime of the kernel, drawing straight into the
//! boot framebuffer. It is the sink klog writes to.

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use kboot::FramebufferInfo;
use kdisplay::{Canvas, Console, ConsoleConfig};
use spin::{Mutex, Once};

static CONSOLE: Once<Mutex<Console<'static>>> = Once::new();
static TRUNCATED_PRINTS: AtomicUsize = AtomicUsize::new(0);

/// Why the framebuffer could not back a console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// Only 32-bit pixels are drawn.
    UnsupportedDepth(u16),
    /// Width, height or pitch do not describe a usable buffer.
    BadGeometry,
}

/// Take over `fb` and clear it. Later calls are no-ops.
pub fn init(fb: &FramebufferInfo) -> Result<(), InitError> {
    if fb.bpp != 32 {
        return Err(InitError::UnsupportedDepth(fb.bpp));
    }
    // SAFETY: Limine maps the framebuffer for the kernel's lifetime and
    // nothing else draws into it once the console exists.
    let canvas = unsafe {
        Canvas::from_raw(
            fb.address.cast::<u32>(),
            fb.width as usize,
            fb.height as usize,
            fb.stride_pixels() as usize,
        )
    }
    .ok_or(InitError::BadGeometry)?;
    CONSOLE.call_once(|| Mutex::new(Console::new(canvas, ConsoleConfig::DEFAULT)));
    Ok(())
}

/// klog sink.
pub fn write(args: fmt::Arguments<'_>) {
    if let Some(console) = CONSOLE.get() {
        if console.lock().print(args) {
            TRUNCATED_PRINTS.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Prints so far that did not fit the console's format buffer.
pub fn truncated_prints() -> usize {
    TRUNCATED_PRINTS.load(Ordering::Relaxed)
}

/// Release the console lock regardless of who holds it.
///
/// # Safety
///
/// Only for paths that never return to the code that may hold the lock:
/// the panic handler and the interrupt dispatcher.
pub unsafe fn force_unlock() {
    if let Some(console) = CONSOLE.get() {
        unsafe { console.force_unlock() };
    }
}
