//! Thin wrappers around privileged CPU instructions.

use x86_64::instructions::{self, interrupts};
use x86_64::registers::control::Cr2;

/// Halts the CPU in an unrecoverable state.
///
/// Disables interrupts and then halts. The CPU will never wake up.
/// Used for fatal errors (unexpected interrupt, panic) where we can't continue.
#[inline]
pub fn halt_forever() -> ! {
    loop {
        interrupts::disable();
        instructions::hlt();
    }
}

/// Reads CR2, the linear address of the most recent page fault.
///
/// Only meaningful inside a page fault handler (vector 14).
#[inline]
pub fn fault_address() -> u64 {
    Cr2::read_raw()
}
