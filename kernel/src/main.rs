// =============================================================================
// Lantern: Kernel Entry Point
// =============================================================================
//
// Limine has already put the CPU in long mode, mapped the kernel in the
// higher half, mapped all physical memory at the HHDM offset and filled in
// our request records. Interrupts are disabled and only the boot processor
// is running.
//
// BRING-UP ORDER:
//   1. Collect the boot context (halts if the loader cannot give us one)
//   2. Console on the framebuffer, then klog on the console
//   3. Report what the loader handed over
//   4. Install the IDT (every vector points at its entry stub)
//   5. Remap the legacy PICs to 0x20 / 0x28
//   6. Halt
//
// Interrupts are never enabled; any exception ends in interrupt_dispatch(),
// which reports it and halts.
//
// Build with `cargo build -p lantern-kernel --target x86_64-unknown-none`.
// =============================================================================

#![no_std]
#![no_main]

mod arch;
mod drivers;
mod traps;
mod util;

use arch::boot::LimineBoot;
use kboot::{BootContext, MemoryKind};
use khal::{ChainedPics, SystemPorts, cpu};

/// The kernel's main entry point. Limine jumps here; see linker.ld.
#[unsafe(no_mangle)]
extern "C" fn kmain() -> ! {
    // Nothing can be shown until the console exists, so a bad boot context
    // just halts.
    let Ok(context) = BootContext::collect(&LimineBoot) else {
        cpu::halt_forever();
    };

    if drivers::console::init(&context.framebuffer).is_err() {
        cpu::halt_forever();
    }
    klog::init(drivers::console::write);

    report_boot_context(&context);

    let idtr = traps::install();
    klog::info!("IDT loaded: base {:#018x} limit {:#x}", idtr.base, idtr.limit);

    // Same offsets interrupt_dispatch() classifies against.
    let pics = ChainedPics::REMAPPED;
    let mut ports = SystemPorts;
    // SAFETY: interrupts are disabled and every vector the PICs can now
    // raise has a gate.
    unsafe { pics.remap(&mut ports) };
    let (master, slave) = pics.offsets();
    klog::info!("PIC remapped: master {master:#x}, slave {slave:#x}");
    klog::info!(
        "PIC IRR {:#06x} ISR {:#06x}",
        pics.read_irr(&mut ports),
        pics.read_isr(&mut ports)
    );

    let truncated = drivers::console::truncated_prints();
    if truncated > 0 {
        klog::warn!("{truncated} console prints were cut short");
    }

    klog::info!("bring-up complete, halting");
    cpu::halt_forever()
}

fn report_boot_context(context: &BootContext) {
    let fb = &context.framebuffer;
    klog::info!(
        "booted by {} {}",
        context.bootloader.name,
        context.bootloader.version
    );
    klog::info!(
        "framebuffer {}x{} @ {} bpp, pitch {} at {:p}",
        fb.width,
        fb.height,
        fb.bpp,
        fb.pitch,
        fb.address
    );
    if let Some(offset) = context.hhdm_offset {
        klog::info!("HHDM offset {offset:#018x}");
    }

    klog::info!("memory map ({} entries):", context.memory_map.len());
    for entry in context.memory_map.iter() {
        klog::print!("  {entry}\n");
    }
    if context.memory_map.dropped() > 0 {
        klog::warn!(
            "memory map truncated, {} entries not kept",
            context.memory_map.dropped()
        );
    }

    let memory = &context.memory;
    klog::info!("total memory:  {} MiB", memory.total_bytes / 1024 / 1024);
    klog::info!("usable memory: {} MiB", memory.usable_bytes / 1024 / 1024);
    match memory.allocator_candidate {
        // First usable entry, not the largest one.
        Some(entry) => klog::info!("allocator region: {entry}"),
        None => klog::warn!("no {} memory reported", MemoryKind::Usable),
    }

    match &context.rsdp {
        Ok(rsdp) => {
            klog::info!(
                "RSDP at {:#x}: OEM \"{}\" revision {} root table {:#x}",
                rsdp.address,
                rsdp.oem_id(),
                rsdp.revision,
                rsdp.root_table_address()
            );
            if !rsdp.checksum_valid() {
                klog::warn!("RSDP checksum mismatch, continuing");
            }
        }
        Err(err) => klog::error!("RSDP at {:#x}: {err}", context.rsdp_address),
    }

    let tables = &context.descriptor_tables;
    klog::info!(
        "GDTR {:#018x} limit {:#x}, IDTR {:#018x} limit {:#x}",
        tables.gdtr.base,
        tables.gdtr.limit,
        tables.idtr.base,
        tables.idtr.limit
    );
}
