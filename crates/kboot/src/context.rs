//! The boot context: everything the kernel learns from the boot loader,
//! gathered once and passed around by reference afterwards.

use khal::DescriptorTableRegister;

use crate::error::{BootError, RsdpError};
use crate::memory::{MemoryMap, MemoryMapEntry, MemorySummary};
use crate::rsdp::{RSDP_V1_LEN, RSDP_V2_LEN, RootSystemDescriptorPointer};

/// A linear framebuffer handed over by the boot loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferInfo {
    pub address: *mut u8,
    pub width: u64,
    pub height: u64,
    /// Bytes per row.
    pub pitch: u64,
    pub bpp: u16,
}

impl FramebufferInfo {
    /// Row stride in whole pixels.
    pub const fn stride_pixels(&self) -> u64 {
        match self.bpp {
            0..=7 => self.pitch,
            bpp => self.pitch / (bpp as u64 / 8),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootloaderInfo {
    pub name: &'static str,
    pub version: &'static str,
}

impl BootloaderInfo {
    pub const UNKNOWN: Self = Self {
        name: "unknown",
        version: "?",
    };
}

/// GDTR and IDTR as the boot loader left them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DescriptorSnapshot {
    pub gdtr: DescriptorTableRegister,
    pub idtr: DescriptorTableRegister,
}

/// Where boot information comes from.
///
/// The kernel implements this over its Limine requests; tests implement it
/// with plain data.
pub trait BootSource {
    /// Whether the loader accepted the base revision the kernel asked for.
    fn base_revision_supported(&self) -> bool;

    /// The first framebuffer, if any.
    fn framebuffer(&self) -> Option<FramebufferInfo>;

    fn bootloader(&self) -> Option<BootloaderInfo>;

    /// Feed every memory map entry, in loader order, to `visit`.
    ///
    /// Returns `false` when the loader gave no memory map at all.
    fn memory_map(&self, visit: &mut dyn FnMut(MemoryMapEntry)) -> bool;

    /// Physical address of the RSDP.
    fn rsdp_address(&self) -> Option<u64>;

    /// Offset of the higher-half direct map.
    fn hhdm_offset(&self) -> Option<u64>;

    /// Copy `buf.len()` bytes of physical memory starting at `address`.
    fn read_physical(&self, address: u64, buf: &mut [u8]) -> bool;

    fn descriptor_tables(&self) -> DescriptorSnapshot;
}

/// Read and decode the RSDP at `address`, first the ACPI 1.0 part, then the
/// extension if the revision asks for it.
pub fn read_rsdp(
    source: &impl BootSource,
    address: u64,
) -> Result<RootSystemDescriptorPointer, RsdpError> {
    let mut bytes = [0u8; RSDP_V2_LEN];
    if !source.read_physical(address, &mut bytes[..RSDP_V1_LEN]) {
        return Err(RsdpError::Unreadable);
    }
    let len = RootSystemDescriptorPointer::required_len(&bytes[..RSDP_V1_LEN]);
    if len > RSDP_V1_LEN {
        let extension = address
            .checked_add(RSDP_V1_LEN as u64)
            .ok_or(RsdpError::Unreadable)?;
        if !source.read_physical(extension, &mut bytes[RSDP_V1_LEN..len]) {
            return Err(RsdpError::Unreadable);
        }
    }
    RootSystemDescriptorPointer::parse(address, &bytes[..len])
}

/// Everything collected at boot. Built once by [`BootContext::collect`].
#[derive(Debug, Clone)]
pub struct BootContext {
    pub bootloader: BootloaderInfo,
    pub framebuffer: FramebufferInfo,
    pub memory_map: MemoryMap,
    pub memory: MemorySummary,
    pub hhdm_offset: Option<u64>,
    pub rsdp_address: u64,
    /// The decoded RSDP. A decode failure is kept rather than raised; only a
    /// missing address is fatal.
    pub rsdp: Result<RootSystemDescriptorPointer, RsdpError>,
    pub descriptor_tables: DescriptorSnapshot,
}

impl BootContext {
    pub fn collect(source: &impl BootSource) -> Result<Self, BootError> {
        if !source.base_revision_supported() {
            return Err(BootError::ProtocolUnsupported);
        }
        let framebuffer = source.framebuffer().ok_or(BootError::MissingFramebuffer)?;

        let mut memory_map = MemoryMap::new();
        if !source.memory_map(&mut |entry| {
            memory_map.push(entry);
        }) {
            return Err(BootError::MissingMemoryMap);
        }
        let memory = memory_map.summary();

        let rsdp_address = source
            .rsdp_address()
            .filter(|&address| address != 0)
            .ok_or(BootError::MissingRootDescriptorPointer)?;

        Ok(Self {
            bootloader: source.bootloader().unwrap_or(BootloaderInfo::UNKNOWN),
            framebuffer,
            memory_map,
            memory,
            hhdm_offset: source.hhdm_offset(),
            rsdp_address,
            rsdp: read_rsdp(source, rsdp_address),
            descriptor_tables: source.descriptor_tables(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKind;
    use crate::rsdp::RSDP_SIGNATURE;
    use std::vec::Vec;

    const RSDP_AT: u64 = 0xE_0000;

    struct FakeSource {
        revision_ok: bool,
        framebuffer: Option<FramebufferInfo>,
        memory: Option<Vec<MemoryMapEntry>>,
        rsdp_address: Option<u64>,
        /// Physical memory starting at `physical_at`.
        physical: Vec<u8>,
        physical_at: u64,
    }

    fn framebuffer() -> FramebufferInfo {
        FramebufferInfo {
            address: 0x1000 as *mut u8,
            width: 1280,
            height: 800,
            pitch: 1280 * 4,
            bpp: 32,
        }
    }

    fn rsdp_bytes() -> Vec<u8> {
        let mut bytes = Vec::from(&RSDP_SIGNATURE[..]);
        bytes.push(0);
        bytes.extend_from_slice(b"LIMINE");
        bytes.push(0);
        bytes.extend_from_slice(&0x7FE_0000u32.to_le_bytes());
        let sum = bytes.iter().fold(0u8, |a, &b| a.wrapping_add(b));
        bytes[8] = 0u8.wrapping_sub(sum);
        bytes
    }

    impl Default for FakeSource {
        fn default() -> Self {
            Self {
                revision_ok: true,
                framebuffer: Some(framebuffer()),
                memory: Some(Vec::from([
                    MemoryMapEntry::new(0, 0x1000, MemoryKind::Reserved),
                    MemoryMapEntry::new(0x1000, 0x9000, MemoryKind::Usable),
                    MemoryMapEntry::new(0xA000, 0x5000, MemoryKind::Usable),
                ])),
                rsdp_address: Some(RSDP_AT),
                physical: rsdp_bytes(),
                physical_at: RSDP_AT,
            }
        }
    }

    impl BootSource for FakeSource {
        fn base_revision_supported(&self) -> bool {
            self.revision_ok
        }

        fn framebuffer(&self) -> Option<FramebufferInfo> {
            self.framebuffer
        }

        fn bootloader(&self) -> Option<BootloaderInfo> {
            Some(BootloaderInfo {
                name: "Limine",
                version: "9.3.0",
            })
        }

        fn memory_map(&self, visit: &mut dyn FnMut(MemoryMapEntry)) -> bool {
            match &self.memory {
                Some(entries) => {
                    entries.iter().copied().for_each(visit);
                    true
                }
                None => false,
            }
        }

        fn rsdp_address(&self) -> Option<u64> {
            self.rsdp_address
        }

        fn hhdm_offset(&self) -> Option<u64> {
            Some(0xFFFF_8000_0000_0000)
        }

        fn read_physical(&self, address: u64, buf: &mut [u8]) -> bool {
            let Some(start) = address.checked_sub(self.physical_at) else {
                return false;
            };
            let start = start as usize;
            match self.physical.get(start..start + buf.len()) {
                Some(src) => {
                    buf.copy_from_slice(src);
                    true
                }
                None => false,
            }
        }

        fn descriptor_tables(&self) -> DescriptorSnapshot {
            DescriptorSnapshot {
                gdtr: DescriptorTableRegister::for_table(0x8000, 7 * 8),
                idtr: DescriptorTableRegister::default(),
            }
        }
    }

    #[test]
    fn collects_everything() {
        let context = BootContext::collect(&FakeSource::default()).unwrap();
        assert_eq!(context.bootloader.name, "Limine");
        assert_eq!(context.framebuffer.stride_pixels(), 1280);
        assert_eq!(context.memory_map.len(), 3);
        assert_eq!(context.memory.total_bytes, 0xF000);
        assert_eq!(context.rsdp_address, RSDP_AT);
        let rsdp = context.rsdp.unwrap();
        assert_eq!(rsdp.oem_id(), "LIMINE");
        assert!(rsdp.checksum_valid());
        assert_eq!(context.descriptor_tables.gdtr.limit, 55);
    }

    #[test]
    fn unsupported_revision_stops_first() {
        let source = FakeSource {
            revision_ok: false,
            framebuffer: None,
            ..FakeSource::default()
        };
        assert_eq!(
            BootContext::collect(&source).unwrap_err(),
            BootError::ProtocolUnsupported
        );
    }

    #[test]
    fn missing_responses_are_fatal() {
        let source = FakeSource {
            framebuffer: None,
            ..FakeSource::default()
        };
        assert_eq!(
            BootContext::collect(&source).unwrap_err(),
            BootError::MissingFramebuffer
        );

        let source = FakeSource {
            memory: None,
            ..FakeSource::default()
        };
        assert_eq!(
            BootContext::collect(&source).unwrap_err(),
            BootError::MissingMemoryMap
        );

        let source = FakeSource {
            rsdp_address: Some(0),
            ..FakeSource::default()
        };
        assert_eq!(
            BootContext::collect(&source).unwrap_err(),
            BootError::MissingRootDescriptorPointer
        );
    }

    #[test]
    fn unreadable_rsdp_is_kept_not_fatal() {
        let source = FakeSource {
            physical: Vec::new(),
            ..FakeSource::default()
        };
        let context = BootContext::collect(&source).unwrap();
        assert_eq!(context.rsdp.unwrap_err(), RsdpError::Unreadable);
    }

    #[test]
    fn extension_past_top_of_address_space_is_unreadable() {
        let mut header = rsdp_bytes();
        header[15] = 2;
        let top = u64::MAX - (RSDP_V1_LEN as u64 - 1);
        let source = FakeSource {
            physical: header,
            physical_at: top,
            ..FakeSource::default()
        };
        assert_eq!(read_rsdp(&source, top).unwrap_err(), RsdpError::Unreadable);
    }

    #[test]
    fn bad_checksum_still_collects() {
        let mut source = FakeSource::default();
        source.physical[8] ^= 0xFF;
        let context = BootContext::collect(&source).unwrap();
        assert!(!context.rsdp.unwrap().checksum_valid());
    }
}
