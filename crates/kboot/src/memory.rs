//! Physical memory map as handed over by the boot loader.
//!
//! Entries keep the loader's order. Nothing here assumes they are sorted or
//! non-overlapping.

use core::fmt;

/// Type tag of a memory map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryKind {
    Usable,
    Reserved,
    AcpiReclaimable,
    AcpiNvs,
    BadMemory,
    BootloaderReclaimable,
    ExecutableAndModules,
    Framebuffer,
}

impl MemoryKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Usable => "Usable",
            Self::Reserved => "Reserved",
            Self::AcpiReclaimable => "ACPI Reclaimable",
            Self::AcpiNvs => "ACPI NVS",
            Self::BadMemory => "Bad Memory",
            Self::BootloaderReclaimable => "Bootloader Reclaimable",
            Self::ExecutableAndModules => "Kernel & Modules",
            Self::Framebuffer => "Framebuffer",
        }
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One contiguous physical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMapEntry {
    pub base: u64,
    /// Length in bytes.
    pub length: u64,
    pub kind: MemoryKind,
}

impl MemoryMapEntry {
    pub const fn new(base: u64, length: u64, kind: MemoryKind) -> Self {
        Self { base, length, kind }
    }

    /// Exclusive end address.
    pub const fn end(&self) -> u64 {
        self.base.saturating_add(self.length)
    }
}

impl fmt::Display for MemoryMapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#012x} - {:#012x}  {:>10} KiB  {}",
            self.base,
            self.end(),
            self.length / 1024,
            self.kind
        )
    }
}

/// Most entries the context keeps. Real firmware maps stay well below this.
pub const MEMORY_MAP_CAPACITY: usize = 256;

const EMPTY: MemoryMapEntry = MemoryMapEntry::new(0, 0, MemoryKind::Reserved);

/// Fixed-capacity copy of the loader's memory map.
#[derive(Clone)]
pub struct MemoryMap {
    entries: [MemoryMapEntry; MEMORY_MAP_CAPACITY],
    len: usize,
    dropped: usize,
}

impl MemoryMap {
    pub const fn new() -> Self {
        Self {
            entries: [EMPTY; MEMORY_MAP_CAPACITY],
            len: 0,
            dropped: 0,
        }
    }

    /// Append an entry. Once full, further entries are counted and dropped.
    pub fn push(&mut self, entry: MemoryMapEntry) -> bool {
        match self.entries.get_mut(self.len) {
            Some(slot) => {
                *slot = entry;
                self.len += 1;
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    pub fn as_slice(&self) -> &[MemoryMapEntry] {
        &self.entries[..self.len]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, MemoryMapEntry> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entries that did not fit.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn summary(&self) -> MemorySummary {
        MemorySummary::of(self.as_slice())
    }
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl FromIterator<MemoryMapEntry> for MemoryMap {
    fn from_iter<I: IntoIterator<Item = MemoryMapEntry>>(iter: I) -> Self {
        let mut map = Self::new();
        for entry in iter {
            map.push(entry);
        }
        map
    }
}

impl<'a> IntoIterator for &'a MemoryMap {
    type Item = &'a MemoryMapEntry;
    type IntoIter = core::slice::Iter<'a, MemoryMapEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Totals gathered in one pass over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemorySummary {
    /// Sum of every entry's length, whatever its kind.
    pub total_bytes: u64,
    /// Sum of USABLE entries' lengths.
    pub usable_bytes: u64,
    /// Region earmarked for the future frame allocator.
    ///
    /// This is the first USABLE entry in loader order, not the largest one;
    /// the selection has always behaved that way and is kept until the
    /// allocator hand-off defines what it wants.
    pub allocator_candidate: Option<MemoryMapEntry>,
}

impl MemorySummary {
    pub fn of(entries: &[MemoryMapEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.total_bytes = summary.total_bytes.saturating_add(entry.length);
            if entry.kind == MemoryKind::Usable {
                summary.usable_bytes = summary.usable_bytes.saturating_add(entry.length);
                if summary.allocator_candidate.is_none() {
                    summary.allocator_candidate = Some(*entry);
                }
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::ToString;

    #[test]
    fn totals_count_every_kind() {
        let map: MemoryMap = [
            MemoryMapEntry::new(0, 0x1000, MemoryKind::Reserved),
            MemoryMapEntry::new(0x1000, 0x9000, MemoryKind::Usable),
            MemoryMapEntry::new(0xA000, 0x5000, MemoryKind::Usable),
        ]
        .into_iter()
        .collect();

        let summary = map.summary();
        assert_eq!(summary.total_bytes, 0xF000);
        assert_eq!(summary.usable_bytes, 0xE000);
        assert_eq!(
            summary.allocator_candidate,
            Some(MemoryMapEntry::new(0x1000, 0x9000, MemoryKind::Usable))
        );
    }

    #[test]
    fn candidate_is_first_usable_not_largest() {
        let summary = MemorySummary::of(&[
            MemoryMapEntry::new(0x0, 0x1000, MemoryKind::Usable),
            MemoryMapEntry::new(0x10_0000, 0x4000_0000, MemoryKind::Usable),
        ]);
        assert_eq!(summary.allocator_candidate.map(|e| e.length), Some(0x1000));
    }

    #[test]
    fn no_usable_entry_means_no_candidate() {
        let summary = MemorySummary::of(&[MemoryMapEntry::new(0, 0x1000, MemoryKind::BadMemory)]);
        assert_eq!(summary.total_bytes, 0x1000);
        assert_eq!(summary.allocator_candidate, None);
    }

    #[test]
    fn order_is_preserved_and_overflow_counted() {
        let mut map = MemoryMap::new();
        for i in 0..(MEMORY_MAP_CAPACITY as u64 + 3) {
            map.push(MemoryMapEntry::new(0x1000 * (1000 - i), 0x1000, MemoryKind::Reserved));
        }
        assert_eq!(map.len(), MEMORY_MAP_CAPACITY);
        assert_eq!(map.dropped(), 3);
        assert_eq!(map.as_slice()[0].base, 0x1000 * 1000);
        assert_eq!(map.as_slice()[1].base, 0x1000 * 999);
    }

    #[test]
    fn entry_line_format() {
        let entry = MemoryMapEntry::new(0x10_0000, 0x20_0000, MemoryKind::ExecutableAndModules);
        assert_eq!(
            entry.to_string(),
            "0x0000100000 - 0x0000300000        2048 KiB  Kernel & Modules"
        );
    }
}
