use thiserror::Error;

/// Conditions that stop the kernel before the boot context exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BootError {
    #[error("boot loader does not support the requested base revision")]
    ProtocolUnsupported,
    #[error("boot loader provided no framebuffer")]
    MissingFramebuffer,
    #[error("boot loader provided no memory map")]
    MissingMemoryMap,
    #[error("boot loader provided no ACPI root system description pointer")]
    MissingRootDescriptorPointer,
}

/// Why an RSDP could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RsdpError {
    #[error("RSDP needs {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },
    #[error("RSDP signature mismatch")]
    BadSignature,
    #[error("RSDP memory could not be read")]
    Unreadable,
}
