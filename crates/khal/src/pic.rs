//! Legacy 8259 PIC (Programmable Interrupt Controller) driver.
//!
//! The two cascaded 8259s come out of firmware delivering IRQ 0-7 on vectors
//! 0x08-0x0F, which overlap with CPU exception vectors. [`ChainedPics::remap`]
//! moves them to [`PIC1_OFFSET`]..[`PIC2_OFFSET`]+7 and unmasks every line.
//!
//! No end-of-interrupt is ever sent by this core, so after the first delivered
//! IRQ a line stays in service until reset.

use crate::port::PortBus;

/// I/O port addresses for the master PIC.
const PIC1_COMMAND: u16 = 0x20;
const PIC1_DATA: u16 = 0x21;

/// I/O port addresses for the slave PIC.
const PIC2_COMMAND: u16 = 0xA0;
const PIC2_DATA: u16 = 0xA1;

/// ICW1: Initialization Command Word 1 - begin initialization sequence.
const ICW1_INIT: u8 = 0x10;
/// ICW1: ICW4 will be sent.
const ICW1_ICW4: u8 = 0x01;
/// ICW4: 8086/88 mode (as opposed to MCS-80/85 mode).
const ICW4_8086: u8 = 0x01;

/// IRQ line on the master that the slave is wired to.
const CASCADE_IRQ: u8 = 2;

/// OCW3: next command-port read returns the interrupt request register.
const OCW3_READ_IRR: u8 = 0x0A;
/// OCW3: next command-port read returns the in-service register.
const OCW3_READ_ISR: u8 = 0x0B;

/// Remap offset for PIC1 (IRQ 0-7 → vectors 32-39).
pub const PIC1_OFFSET: u8 = 0x20;
/// Remap offset for PIC2 (IRQ 8-15 → vectors 40-47).
pub const PIC2_OFFSET: u8 = 0x28;

/// One 8259 controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Pic {
    offset: u8,
    command: u16,
    data: u16,
}

impl Pic {
    /// Input line on this controller that arrives on `vector`.
    const fn line(&self, vector: u8) -> Option<u8> {
        match vector.checked_sub(self.offset) {
            Some(line) if line < 8 => Some(line),
            _ => None,
        }
    }
}

/// The master/slave 8259 pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedPics {
    master: Pic,
    slave: Pic,
}

impl ChainedPics {
    /// The pair as [`ChainedPics::remap`] leaves it by default: master on
    /// [`PIC1_OFFSET`], slave on [`PIC2_OFFSET`].
    pub const REMAPPED: Self = Self::new(PIC1_OFFSET, PIC2_OFFSET);

    /// Describe a PIC pair that will deliver on the given vector offsets.
    ///
    /// This doesn't touch hardware; call [`ChainedPics::remap`].
    pub const fn new(master_offset: u8, slave_offset: u8) -> Self {
        Self {
            master: Pic {
                offset: master_offset,
                command: PIC1_COMMAND,
                data: PIC1_DATA,
            },
            slave: Pic {
                offset: slave_offset,
                command: PIC2_COMMAND,
                data: PIC2_DATA,
            },
        }
    }

    /// Vector offsets programmed by [`ChainedPics::remap`], `(master, slave)`.
    ///
    /// ICW2 is write-only on the 8259, so this is the driver's record of what
    /// it wrote.
    pub const fn offsets(&self) -> (u8, u8) {
        (self.master.offset, self.slave.offset)
    }

    /// IRQ number (0-15) delivered on `vector`, or `None` if neither
    /// controller raises it. The master is checked first.
    pub const fn irq_for_vector(&self, vector: u8) -> Option<u8> {
        if let Some(line) = self.master.line(vector) {
            return Some(line);
        }
        match self.slave.line(vector) {
            Some(line) => Some(line + 8),
            None => None,
        }
    }

    /// Run the four-word initialization sequence on both controllers and
    /// unmask every IRQ line.
    ///
    /// # Safety
    ///
    /// Reprograms interrupt hardware. Any unmasked IRQ delivered after this
    /// reaches the vectors at [`ChainedPics::offsets`], so those IDT entries
    /// must be present before interrupts are enabled.
    pub unsafe fn remap(&self, bus: &mut impl PortBus) {
        let (master, slave) = (self.master, self.slave);
        unsafe {
            // ICW1: Begin initialization (cascade mode, ICW4 needed)
            bus.write_u8(master.command, ICW1_INIT | ICW1_ICW4);
            bus.io_wait();
            bus.write_u8(slave.command, ICW1_INIT | ICW1_ICW4);
            bus.io_wait();

            // ICW2: Set vector offsets
            bus.write_u8(master.data, master.offset);
            bus.io_wait();
            bus.write_u8(slave.data, slave.offset);
            bus.io_wait();

            // ICW3: Tell master PIC there is a slave PIC at IRQ2 (bit 2)
            bus.write_u8(master.data, 1 << CASCADE_IRQ);
            bus.io_wait();
            // ICW3: Tell slave PIC its cascade identity (IRQ2 = 2)
            bus.write_u8(slave.data, CASCADE_IRQ);
            bus.io_wait();

            // ICW4: Set 8086 mode
            bus.write_u8(master.data, ICW4_8086);
            bus.io_wait();
            bus.write_u8(slave.data, ICW4_8086);
            bus.io_wait();

            // Unmask all IRQs on both PICs
            bus.write_u8(master.data, 0x00);
            bus.write_u8(slave.data, 0x00);
        }
    }

    /// Combined interrupt request register. Master in bits 0-7, slave in 8-15.
    pub fn read_irr(&self, bus: &mut impl PortBus) -> u16 {
        self.read_register(bus, OCW3_READ_IRR)
    }

    /// Combined in-service register. Master in bits 0-7, slave in 8-15.
    pub fn read_isr(&self, bus: &mut impl PortBus) -> u16 {
        self.read_register(bus, OCW3_READ_ISR)
    }

    fn read_register(&self, bus: &mut impl PortBus, ocw3: u8) -> u16 {
        // SAFETY: OCW3 only selects which register the next command-port
        // read returns; it doesn't change interrupt routing.
        unsafe {
            bus.write_u8(self.master.command, ocw3);
            bus.write_u8(self.slave.command, ocw3);
            let slave = u16::from(bus.read_u8(self.slave.command));
            let master = u16::from(bus.read_u8(self.master.command));
            (slave << 8) | master
        }
    }
}

impl Default for ChainedPics {
    fn default() -> Self {
        Self::REMAPPED
    }
}
