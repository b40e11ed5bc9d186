//! Descriptor-table registers (GDTR / IDTR) and the code segment selector.

use x86_64::VirtAddr;
use x86_64::instructions::tables;
use x86_64::registers::segmentation::{CS, Segment};
use x86_64::structures::DescriptorTablePointer;

/// Base address and limit of a descriptor table, as held by GDTR or IDTR.
///
/// `limit` is the table size in bytes minus one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorTableRegister {
    pub base: u64,
    pub limit: u16,
}

impl DescriptorTableRegister {
    /// Register value describing a table of `size` bytes at `base`.
    pub const fn for_table(base: u64, size: usize) -> Self {
        Self {
            base,
            limit: (size - 1) as u16,
        }
    }

    /// Size of the described table in bytes.
    pub const fn size(&self) -> usize {
        self.limit as usize + 1
    }
}

impl From<DescriptorTablePointer> for DescriptorTableRegister {
    fn from(ptr: DescriptorTablePointer) -> Self {
        Self {
            base: ptr.base.as_u64(),
            limit: ptr.limit,
        }
    }
}

/// Load IDTR.
///
/// # Safety
///
/// `reg` must describe a table of valid 16-byte gate descriptors that stays
/// alive (and in place) for as long as it is loaded.
pub unsafe fn load_idt(reg: DescriptorTableRegister) {
    let ptr = DescriptorTablePointer {
        limit: reg.limit,
        base: VirtAddr::new_truncate(reg.base),
    };
    unsafe { tables::lidt(&ptr) };
}

/// Read the current IDTR.
pub fn read_idt() -> DescriptorTableRegister {
    tables::sidt().into()
}

/// Read the current GDTR.
pub fn read_gdt() -> DescriptorTableRegister {
    tables::sgdt().into()
}

/// The code segment selector the CPU is currently executing with.
pub fn code_selector() -> u16 {
    CS::get_reg().0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_size_minus_one() {
        let reg = DescriptorTableRegister::for_table(0xFFFF_8000_0010_0000, 256 * 16);
        assert_eq!(reg.limit, 4095);
        assert_eq!(reg.size(), 4096);
    }
}
