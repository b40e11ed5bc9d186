//! # RSDP/XSDP (Root/Extended System Description Pointer)
//!
//! Decoded from raw bytes so the caller decides how the physical address is
//! reached. Checksums are computed and exposed, but a failing checksum does
//! not reject the pointer; the kernel only warns about it.

use crate::error::RsdpError;

pub const RSDP_SIGNATURE: &[u8; 8] = b"RSD PTR ";

/// ACPI 1.0 structure length; also the span of the first checksum.
pub const RSDP_V1_LEN: usize = 20;
/// ACPI 2.0+ structure length.
pub const RSDP_V2_LEN: usize = 36;

/// Fields only present from revision 2 on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedRsdp {
    pub length: u32,
    pub xsdt_address: u64,
    pub extended_checksum: u8,
    pub extended_checksum_valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootSystemDescriptorPointer {
    /// Physical address the pointer was read from.
    pub address: u64,
    pub checksum: u8,
    pub oem_id: [u8; 6],
    pub revision: u8,
    pub rsdt_address: u32,
    pub extended: Option<ExtendedRsdp>,
    checksum_valid: bool,
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |a, &b| a.wrapping_add(b))
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

impl RootSystemDescriptorPointer {
    /// How many bytes [`Self::parse`] needs, judged from the first
    /// [`RSDP_V1_LEN`] bytes.
    pub fn required_len(header: &[u8]) -> usize {
        match header.get(15) {
            Some(&revision) if revision >= 2 => RSDP_V2_LEN,
            _ => RSDP_V1_LEN,
        }
    }

    /// Decode an RSDP from its raw bytes.
    pub fn parse(address: u64, bytes: &[u8]) -> Result<Self, RsdpError> {
        if bytes.len() < RSDP_V1_LEN {
            return Err(RsdpError::Truncated {
                needed: RSDP_V1_LEN,
                got: bytes.len(),
            });
        }
        if &bytes[0..8] != RSDP_SIGNATURE {
            return Err(RsdpError::BadSignature);
        }

        let mut oem_id = [0; 6];
        oem_id.copy_from_slice(&bytes[9..15]);
        let revision = bytes[15];

        let extended = if revision >= 2 {
            if bytes.len() < RSDP_V2_LEN {
                return Err(RsdpError::Truncated {
                    needed: RSDP_V2_LEN,
                    got: bytes.len(),
                });
            }
            let length = u32_at(bytes, 20);
            // The extended checksum covers `length` bytes; if the caller
            // didn't supply that many the sum can't be trusted.
            let extended_checksum_valid = bytes
                .get(..length as usize)
                .is_some_and(|covered| sum(covered) == 0);
            Some(ExtendedRsdp {
                length,
                xsdt_address: u64_at(bytes, 24),
                extended_checksum: bytes[32],
                extended_checksum_valid,
            })
        } else {
            None
        };

        Ok(Self {
            address,
            checksum: bytes[8],
            oem_id,
            revision,
            rsdt_address: u32_at(bytes, 16),
            extended,
            checksum_valid: sum(&bytes[..RSDP_V1_LEN]) == 0,
        })
    }

    /// Both checksums (where present) sum to zero.
    pub fn checksum_valid(&self) -> bool {
        self.checksum_valid
            && self
                .extended
                .is_none_or(|extended| extended.extended_checksum_valid)
    }

    /// OEM id as text, trailing padding removed.
    pub fn oem_id(&self) -> &str {
        core::str::from_utf8(&self.oem_id)
            .unwrap_or("??????")
            .trim_end_matches([' ', '\0'])
    }

    /// XSDT address when the pointer has one, RSDT address otherwise.
    pub fn root_table_address(&self) -> u64 {
        match self.extended {
            Some(extended) if extended.xsdt_address != 0 => extended.xsdt_address,
            _ => u64::from(self.rsdt_address),
        }
    }
}
