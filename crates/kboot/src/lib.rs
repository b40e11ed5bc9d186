//! Boot context collection.
//!
//! The kernel describes what the boot loader handed over through
//! [`BootSource`]; [`BootContext::collect`] validates it and copies it into one
//! owned value.

#![cfg_attr(not(test), no_std)]

pub mod context;
pub mod error;
pub mod memory;
pub mod rsdp;

pub use context::{BootContext, BootSource, BootloaderInfo, DescriptorSnapshot, FramebufferInfo};
pub use error::{BootError, RsdpError};
pub use memory::{MemoryKind, MemoryMap, MemoryMapEntry, MemorySummary};
pub use rsdp::RootSystemDescriptorPointer;
