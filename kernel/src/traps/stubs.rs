// =============================================================================
// Lantern: Interrupt Entry Stubs
// =============================================================================
//
// One stub per vector, generated by the assembler. Each stub makes the stack
// look the same regardless of whether the CPU pushed an error code, records
// its vector, and joins `isr_common`, which saves the general registers and
// calls interrupt_dispatch() with a pointer to the resulting InterruptFrame.
//
// STACK ON ENTRY TO interrupt_dispatch (lowest address first):
//   r15 .. rax            15 saved registers (GeneralRegisters)
//   vector                pushed by the stub
//   error code            pushed by the CPU, or a 0 pushed by the stub
//   rip, cs, rflags, rsp, ss   pushed by the CPU
//
// 176 bytes below a 16-byte aligned frame, so the call sees an ABI-aligned
// stack.
//
// `isr_stub_table` holds the 256 stub addresses, indexed by vector. The IDT
// is filled from that table; nothing computes a stub address by arithmetic.
// =============================================================================

use core::arch::global_asm;

use khal::cpu;
use ktrap::dispatch::PAGE_FAULT_VECTOR;
use ktrap::{InterruptFrame, StubTable};

global_asm!(
    // Vectors for which the CPU pushes an error code itself.
    ".macro isr_stub vector",
    ".p2align 4",
    "isr_stub_\\vector:",
    ".if (\\vector == 8) || ((\\vector >= 10) && (\\vector <= 14)) || (\\vector == 17) || (\\vector == 21) || (\\vector == 29) || (\\vector == 30)",
    ".else",
    "    push 0",
    ".endif",
    "    push \\vector",
    "    jmp isr_common",
    ".endm",
    "",
    ".irp h,0,1,2,3,4,5,6,7,8,9,a,b,c,d,e,f",
    ".irp l,0,1,2,3,4,5,6,7,8,9,a,b,c,d,e,f",
    "    isr_stub 0x\\h\\l",
    ".endr",
    ".endr",
    "",
    ".p2align 4",
    "isr_common:",
    "    push rax",
    "    push rbx",
    "    push rcx",
    "    push rdx",
    "    push rbp",
    "    push rsi",
    "    push rdi",
    "    push r8",
    "    push r9",
    "    push r10",
    "    push r11",
    "    push r12",
    "    push r13",
    "    push r14",
    "    push r15",
    "    mov rdi, rsp",
    "    cld",
    "    call {dispatch}",
    // Unreachable while interrupt_dispatch diverges.
    "    pop r15",
    "    pop r14",
    "    pop r13",
    "    pop r12",
    "    pop r11",
    "    pop r10",
    "    pop r9",
    "    pop r8",
    "    pop rdi",
    "    pop rsi",
    "    pop rbp",
    "    pop rdx",
    "    pop rcx",
    "    pop rbx",
    "    pop rax",
    "    add rsp, 16",
    "    iretq",
    "",
    ".pushsection .data.rel.ro.isr_stub_table, \"aw\"",
    ".p2align 3",
    ".global isr_stub_table",
    "isr_stub_table:",
    ".irp h,0,1,2,3,4,5,6,7,8,9,a,b,c,d,e,f",
    ".irp l,0,1,2,3,4,5,6,7,8,9,a,b,c,d,e,f",
    "    .quad isr_stub_0x\\h\\l",
    ".endr",
    ".endr",
    ".popsection",
    dispatch = sym interrupt_dispatch,
);

unsafe extern "C" {
    static isr_stub_table: StubTable;
}

/// Addresses of the 256 entry stubs, indexed by vector.
pub fn stub_table() -> &'static StubTable {
    // SAFETY: defined above, fully initialized at link time, never written.
    unsafe { &*(&raw const isr_stub_table) }
}

/// Common target of every entry stub.
///
/// Nothing acknowledges the PIC and nothing resumes the interrupted code:
/// every interrupt is logged and then the machine halts.
extern "C" fn interrupt_dispatch(frame: &InterruptFrame) -> ! {
    // CR2 first, before anything else has a chance to fault.
    let fault_address = (frame.vector() == PAGE_FAULT_VECTOR).then(cpu::fault_address);

    // The interrupted code may have been halfway through a console write.
    // SAFETY: we never return to it.
    unsafe { crate::drivers::console::force_unlock() };

    ktrap::dispatch::report(frame, fault_address);
    cpu::halt_forever()
}
