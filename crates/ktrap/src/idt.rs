//! The interrupt descriptor table.
//!
//! Every one of the 256 vectors gets its own entry stub. [`Idt::populate`]
//! takes the stub addresses as a table indexed by vector, so no gate address
//! is ever derived from a base address and a stride.

use core::mem::size_of;

use bitflags::bitflags;
use khal::DescriptorTableRegister;

pub const IDT_ENTRIES: usize = 256;

/// Entry-point addresses, one per vector.
pub type StubTable = [usize; IDT_ENTRIES];

bitflags! {
    /// Type and attribute byte of a 64-bit gate descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GateAttributes: u8 {
        const PRESENT = 1 << 7;
        /// Descriptor privilege level, two bits.
        const DPL = 0b11 << 5;
        /// Type nibble 0xE; every gate written here has it.
        const INTERRUPT_GATE = 0b1110;
    }
}

impl GateAttributes {
    /// Present, DPL 0, interrupt gate: 0x8E.
    pub const KERNEL_INTERRUPT: Self = Self::PRESENT.union(Self::INTERRUPT_GATE);

    pub const fn dpl(self) -> u8 {
        (self.bits() & Self::DPL.bits()) >> 5
    }
}

/// One 16-byte gate.
///
/// ```text
///  0..2   handler bits 0..16
///  2..4   code segment selector
///  4      IST index (low 3 bits)
///  5      GateAttributes
///  6..8   handler bits 16..32
///  8..12  handler bits 32..64
/// 12..16  reserved, zero
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct IdtEntry {
    offset_low: u16,
    selector: u16,
    ist: u8,
    attributes: u8,
    offset_mid: u16,
    offset_high: u32,
    reserved: u32,
}

const _: () = assert!(size_of::<IdtEntry>() == 16);

impl IdtEntry {
    /// A gate with the present bit clear. Hardware hitting one of these
    /// raises #NP, or worse.
    pub const MISSING: Self = Self {
        offset_low: 0,
        selector: 0,
        ist: 0,
        attributes: 0,
        offset_mid: 0,
        offset_high: 0,
        reserved: 0,
    };

    pub const fn new(handler: usize, selector: u16, ist: u8, attributes: GateAttributes) -> Self {
        Self {
            offset_low: handler as u16,
            selector,
            ist: ist & 0b111,
            attributes: attributes.bits(),
            offset_mid: (handler >> 16) as u16,
            offset_high: (handler >> 32) as u32,
            reserved: 0,
        }
    }

    pub const fn handler(&self) -> usize {
        self.offset_low as usize
            | (self.offset_mid as usize) << 16
            | (self.offset_high as usize) << 32
    }

    pub const fn selector(&self) -> u16 {
        self.selector
    }

    /// Interrupt stack table index; 0 means "stay on the current stack".
    pub const fn ist(&self) -> u8 {
        self.ist
    }

    pub const fn attributes(&self) -> GateAttributes {
        GateAttributes::from_bits_retain(self.attributes)
    }

    pub const fn is_present(&self) -> bool {
        self.attributes().contains(GateAttributes::PRESENT)
    }
}

/// The full 256-gate table, 4 KiB.
#[repr(C, align(16))]
pub struct Idt {
    entries: [IdtEntry; IDT_ENTRIES],
}

impl Idt {
    pub const fn new() -> Self {
        Self {
            entries: [IdtEntry::MISSING; IDT_ENTRIES],
        }
    }

    /// Point every vector at its stub with a present, ring 0 interrupt gate
    /// and no IST.
    pub fn populate(&mut self, stubs: &StubTable, selector: u16) {
        for (entry, &stub) in self.entries.iter_mut().zip(stubs) {
            *entry = IdtEntry::new(stub, selector, 0, GateAttributes::KERNEL_INTERRUPT);
        }
    }

    pub fn entry(&self, vector: u8) -> &IdtEntry {
        &self.entries[vector as usize]
    }

    /// Every gate present and pointing somewhere.
    pub fn is_complete(&self) -> bool {
        self.entries
            .iter()
            .all(|entry| entry.is_present() && entry.handler() != 0)
    }

    pub fn register(&self) -> DescriptorTableRegister {
        DescriptorTableRegister::for_table(self as *const Self as u64, size_of::<Self>())
    }

    /// Load IDTR with this table and return the value loaded.
    ///
    /// # Panics
    ///
    /// If any gate is still missing.
    pub fn load(&'static self) -> DescriptorTableRegister {
        assert!(self.is_complete(), "IDT loaded with missing vectors");
        let reg = self.register();
        // SAFETY: 'static, and every gate is present.
        unsafe { khal::dtr::load_idt(reg) };
        reg
    }
}

impl Default for Idt {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::boxed::Box;

    const STUB_BASE: usize = 0xFFFF_FFFF_8000_4000;
    const STUB_STRIDE: usize = 16;

    fn stubs() -> StubTable {
        core::array::from_fn(|vector| STUB_BASE + vector * STUB_STRIDE)
    }

    #[test]
    fn populate_points_every_vector_at_its_stub() {
        let mut idt = Box::new(Idt::new());
        idt.populate(&stubs(), 0x28);

        for vector in 0..=255u8 {
            let entry = idt.entry(vector);
            assert_eq!(entry.handler(), STUB_BASE + vector as usize * STUB_STRIDE);
            assert!(entry.is_present(), "vector {vector} not present");
            assert_eq!(entry.selector(), 0x28);
            assert_eq!(entry.attributes().dpl(), 0);
            assert_eq!(entry.attributes(), GateAttributes::KERNEL_INTERRUPT);
            assert_eq!(entry.ist(), 0);
        }
        assert!(idt.is_complete());
    }

    #[test]
    fn kernel_gate_byte_is_0x8e() {
        assert_eq!(GateAttributes::KERNEL_INTERRUPT.bits(), 0x8E);
    }

    #[test]
    fn handler_address_is_split_across_three_fields() {
        let entry = IdtEntry::new(0x1234_5678_9ABC_DEF0, 0x08, 0, GateAttributes::KERNEL_INTERRUPT);
        assert_eq!(entry.offset_low, 0xDEF0);
        assert_eq!(entry.offset_mid, 0x9ABC);
        assert_eq!(entry.offset_high, 0x1234_5678);
        assert_eq!(entry.handler(), 0x1234_5678_9ABC_DEF0);
        assert_eq!(entry.reserved, 0);
    }

    #[test]
    fn fresh_table_is_incomplete() {
        let idt = Box::new(Idt::new());
        assert!(!idt.is_complete());
        assert!(!idt.entry(0).is_present());
        assert!(!idt.entry(255).is_present());
    }

    #[test]
    fn null_stub_leaves_table_incomplete() {
        let mut table = stubs();
        table[77] = 0;
        let mut idt = Box::new(Idt::new());
        idt.populate(&table, 0x28);
        assert!(idt.entry(77).is_present());
        assert!(!idt.is_complete());
    }

    #[test]
    fn register_covers_whole_table() {
        let idt = Box::new(Idt::new());
        let reg = idt.register();
        assert_eq!(reg.limit, 256 * 16 - 1);
        assert_eq!(reg.base, &*idt as *const Idt as u64);
    }

    #[test]
    fn dpl_and_ist_are_masked() {
        let user_trap = GateAttributes::from_bits_retain(0xEF);
        assert_eq!(user_trap.dpl(), 3);

        let entry = IdtEntry::new(STUB_BASE, 0x08, 0xFF, user_trap);
        assert_eq!(entry.ist(), 0b111);
        assert_eq!(entry.attributes().dpl(), 3);
        assert_eq!(entry.attributes().bits(), 0xEF);
    }
}
