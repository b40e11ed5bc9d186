//! The register snapshot every entry stub builds on the stack.
//!
//! Field order mirrors the stub: the CPU pushes [`ReturnFrame`], the stub
//! pushes an error code (a zero placeholder for vectors without one) and the
//! vector number, then the general-purpose registers from `rax` down to `r15`.
//! The dispatcher receives a pointer to the lowest address, i.e. `r15`.

use core::fmt;

/// General-purpose registers saved by the entry stub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct GeneralRegisters {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rdi: u64,
    pub rsi: u64,
    pub rbp: u64,
    pub rdx: u64,
    pub rcx: u64,
    pub rbx: u64,
    pub rax: u64,
}

/// What the CPU pushes on interrupt entry in long mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct ReturnFrame {
    pub rip: u64,
    pub cs: u64,
    pub rflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

/// Full interrupt-time snapshot handed to the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct InterruptFrame {
    pub regs: GeneralRegisters,
    pub vector: u64,
    pub error_code: u64,
    pub ret: ReturnFrame,
}

/// Size of the frame in bytes; the stubs pop exactly this much minus the
/// hardware part before `iretq`.
pub const FRAME_SIZE: usize = core::mem::size_of::<InterruptFrame>();

const _: () = assert!(FRAME_SIZE == 22 * 8);

/// Exceptions for which the CPU pushes an error code itself.
pub const fn pushes_error_code(vector: u8) -> bool {
    matches!(vector, 8 | 10..=14 | 17 | 21 | 29 | 30)
}

impl InterruptFrame {
    /// The vector this frame was taken on.
    pub fn vector(&self) -> u8 {
        self.vector as u8
    }

    /// The hardware error code, if this vector carries one.
    pub fn error_code(&self) -> Option<u64> {
        pushes_error_code(self.vector()).then_some(self.error_code)
    }
}

impl fmt::Display for ReturnFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rip={:#018x} cs={:#06x} rflags={:#010x} rsp={:#018x} ss={:#06x}",
            self.rip, self.cs, self.rflags, self.rsp, self.ss
        )
    }
}
