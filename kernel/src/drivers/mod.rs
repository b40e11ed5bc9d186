// =============================================================================
// Lantern: Kernel Drivers
// =============================================================================
//
//   console.rs   the framebuffer text console (the only output device)
//
// The PIC driver is hardware-independent enough to be tested on a host and
// lives in the khal crate.
// =============================================================================

pub mod console;
