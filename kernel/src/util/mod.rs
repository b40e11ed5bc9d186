// =============================================================================
// Lantern: Kernel Utilities
// =============================================================================
//
//   panic.rs   panic handler (what happens when the kernel panics)
// =============================================================================

pub mod panic;
