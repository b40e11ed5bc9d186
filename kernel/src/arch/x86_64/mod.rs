// =============================================================================
// Lantern: x86_64 Architecture Support
// =============================================================================
//
// Port I/O, descriptor-table registers and the PIC live in the khal crate.
// What stays here is what cannot be tested on a host:
//
//   boot.rs   Limine request records and the BootSource built on them
// =============================================================================

pub mod boot;
