// =============================================================================
// Lantern: Limine Boot Protocol Interface
// =============================================================================
//
// The kernel declares what it needs as static request records. Limine scans
// the loaded image for their magic numbers before jumping to kmain() and
// fills in a response pointer for each one it understands.
//
// Nothing here interprets the responses: LimineBoot hands them to
// kboot::BootContext::collect() through the BootSource trait, which does
// all of the validation.
//
// =============================================================================

use kboot::{
    BootSource, BootloaderInfo, DescriptorSnapshot, FramebufferInfo, MemoryKind, MemoryMapEntry,
};
use khal::dtr;
use limine::BaseRevision;
use limine::memory_map::EntryType;
use limine::request::{
    BootloaderInfoRequest, FramebufferRequest, HhdmRequest, MemoryMapRequest, RsdpRequest,
};

// =============================================================================
// Limine Request Declarations
// =============================================================================
//
// `#[used]` keeps the records alive even though no Rust code reads them
// before Limine has run; the `.limine_requests` section is KEEP()'d by
// linker.ld so the linker cannot discard them either.
// =============================================================================

/// Base revision tag. Limine zeroes it when it supports the revision we ask
/// for; see [`BootSource::base_revision_supported`].
#[used]
#[unsafe(link_section = ".limine_requests")]
static BASE_REVISION: BaseRevision = BaseRevision::new();

#[used]
#[unsafe(link_section = ".limine_requests")]
static FRAMEBUFFER_REQUEST: FramebufferRequest = FramebufferRequest::new();

#[used]
#[unsafe(link_section = ".limine_requests")]
static BOOTLOADER_INFO_REQUEST: BootloaderInfoRequest = BootloaderInfoRequest::new();

/// Physical memory map, in whatever order the loader produced it.
#[used]
#[unsafe(link_section = ".limine_requests")]
static MEMORY_MAP_REQUEST: MemoryMapRequest = MemoryMapRequest::new();

/// ACPI Root System Description Pointer.
#[used]
#[unsafe(link_section = ".limine_requests")]
static RSDP_REQUEST: RsdpRequest = RsdpRequest::new();

/// Higher Half Direct Map: physical address P is mapped at P + offset.
/// Needed to read the RSDP, which Limine reports by physical address.
#[used]
#[unsafe(link_section = ".limine_requests")]
static HHDM_REQUEST: HhdmRequest = HhdmRequest::new();

// =============================================================================
// BootSource implementation
// =============================================================================

/// The Limine responses, seen through [`BootSource`].
///
/// Only valid once Limine has filled the requests in, i.e. from kmain()
/// onwards.
pub struct LimineBoot;

/// Memory-map type tags, in the order Limine numbers them.
const ENTRY_KINDS: [(EntryType, MemoryKind); 8] = [
    (EntryType::USABLE, MemoryKind::Usable),
    (EntryType::RESERVED, MemoryKind::Reserved),
    (EntryType::ACPI_RECLAIMABLE, MemoryKind::AcpiReclaimable),
    (EntryType::ACPI_NVS, MemoryKind::AcpiNvs),
    (EntryType::BAD_MEMORY, MemoryKind::BadMemory),
    (EntryType::BOOTLOADER_RECLAIMABLE, MemoryKind::BootloaderReclaimable),
    (EntryType::EXECUTABLE_AND_MODULES, MemoryKind::ExecutableAndModules),
    (EntryType::FRAMEBUFFER, MemoryKind::Framebuffer),
];

/// Types newer than this kernel are treated as reserved.
fn memory_kind(entry_type: EntryType) -> MemoryKind {
    ENTRY_KINDS
        .iter()
        .find(|(tag, _)| *tag == entry_type)
        .map_or(MemoryKind::Reserved, |&(_, kind)| kind)
}

impl BootSource for LimineBoot {
    fn base_revision_supported(&self) -> bool {
        BASE_REVISION.is_supported()
    }

    fn framebuffer(&self) -> Option<FramebufferInfo> {
        // Only the first framebuffer is ever used.
        let fb = FRAMEBUFFER_REQUEST.get_response()?.framebuffers().next()?;
        Some(FramebufferInfo {
            address: fb.addr(),
            width: fb.width(),
            height: fb.height(),
            pitch: fb.pitch(),
            bpp: fb.bpp(),
        })
    }

    fn bootloader(&self) -> Option<BootloaderInfo> {
        let response = BOOTLOADER_INFO_REQUEST.get_response()?;
        Some(BootloaderInfo {
            name: response.name(),
            version: response.version(),
        })
    }

    fn memory_map(&self, visit: &mut dyn FnMut(MemoryMapEntry)) -> bool {
        let Some(response) = MEMORY_MAP_REQUEST.get_response() else {
            return false;
        };
        for entry in response.entries() {
            visit(MemoryMapEntry::new(
                entry.base,
                entry.length,
                memory_kind(entry.entry_type),
            ));
        }
        true
    }

    fn rsdp_address(&self) -> Option<u64> {
        Some(RSDP_REQUEST.get_response()?.address() as u64)
    }

    fn hhdm_offset(&self) -> Option<u64> {
        Some(HHDM_REQUEST.get_response()?.offset())
    }

    fn read_physical(&self, address: u64, buf: &mut [u8]) -> bool {
        let Some(offset) = self.hhdm_offset() else {
            return false;
        };
        // Older base revisions hand out the RSDP already mapped.
        let virt = if address >= offset {
            address
        } else {
            match address.checked_add(offset) {
                Some(virt) => virt,
                None => return false,
            }
        };
        // SAFETY: the HHDM maps all of physical memory and the range is only
        // read, never retained.
        unsafe {
            core::ptr::copy_nonoverlapping(virt as *const u8, buf.as_mut_ptr(), buf.len());
        }
        true
    }

    fn descriptor_tables(&self) -> DescriptorSnapshot {
        DescriptorSnapshot {
            gdtr: dtr::read_gdt(),
            idtr: dtr::read_idt(),
        }
    }
}
