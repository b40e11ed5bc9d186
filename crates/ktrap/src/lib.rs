//! Interrupt and trap handling.
//!
//! [`idt`] builds the 256-entry descriptor table from a table of per-vector
//! entry stubs; [`dispatch`] is what those stubs end up calling.
#![cfg_attr(not(test), no_std)]

pub mod dispatch;
pub mod frame;
pub mod idt;

pub use dispatch::{InterruptKind, classify};
pub use frame::InterruptFrame;
pub use idt::{GateAttributes, IDT_ENTRIES, Idt, IdtEntry, StubTable};
