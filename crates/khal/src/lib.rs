//! Hardware Abstraction Layer.
//!
//! The only crate that issues port I/O or touches the descriptor-table
//! registers. Every other crate reaches hardware through the types here.
#![cfg_attr(not(test), no_std)]

pub mod cpu;
pub mod dtr;
pub mod pic;
pub mod port;

pub use dtr::DescriptorTableRegister;
pub use pic::ChainedPics;
pub use port::{PortBus, SystemPorts};
