// =============================================================================
// Lantern: Architecture Abstraction
// =============================================================================
//
// Only x86_64 is supported. The rest of the kernel uses `crate::arch::*` and
// never names the architecture directly.
// =============================================================================

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

#[cfg(target_arch = "x86_64")]
pub use x86_64::*;
