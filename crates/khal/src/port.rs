//! x86 port I/O primitives.
//!
//! Everything that talks to an I/O port goes through a [`PortBus`]. The kernel
//! uses [`SystemPorts`], which issues real `in`/`out` instructions; tests swap
//! in a recording bus so device drivers can be exercised on the build host.

use x86_64::instructions::port::Port;

/// An 8-bit port-mapped I/O bus.
pub trait PortBus {
    /// Read a byte from an I/O port.
    ///
    /// # Safety
    ///
    /// Reading from an arbitrary I/O port can have side effects on hardware.
    /// The caller must ensure the port is valid.
    unsafe fn read_u8(&mut self, port: u16) -> u8;

    /// Write a byte to an I/O port.
    ///
    /// # Safety
    ///
    /// Writing to an arbitrary I/O port can have side effects on hardware.
    /// The caller must ensure the port and value are valid.
    unsafe fn write_u8(&mut self, port: u16, value: u8);

    /// Small I/O delay by writing to the unused POST diagnostic port.
    /// Some old hardware requires a delay between PIC commands.
    #[inline]
    fn io_wait(&mut self) {
        // SAFETY: port 0x80 is the POST code port; writes are ignored.
        unsafe { self.write_u8(0x80, 0) }
    }
}

/// The processor's real I/O address space.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPorts;

impl PortBus for SystemPorts {
    #[inline]
    unsafe fn read_u8(&mut self, port: u16) -> u8 {
        let mut port = Port::<u8>::new(port);
        // SAFETY: forwarded from the caller.
        unsafe { port.read() }
    }

    #[inline]
    unsafe fn write_u8(&mut self, port: u16, value: u8) {
        let mut port = Port::<u8>::new(port);
        // SAFETY: forwarded from the caller.
        unsafe { port.write(value) }
    }
}
