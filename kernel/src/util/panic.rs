// =============================================================================
// Lantern: Kernel Panic Handler
// =============================================================================
//
// Every assertion failure ends here. Nothing recovers from it: the message
// goes to the console with the `panic` severity and the CPU halts with
// interrupts disabled.
//
// The console lock is forced open first. A panic raised while formatting a
// log line would otherwise deadlock right here and show nothing.
// =============================================================================

use core::panic::PanicInfo;

use crate::drivers::console;

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    // SAFETY: this function never returns to the lock holder.
    unsafe { console::force_unlock() };

    match info.location() {
        Some(location) => klog::log(
            klog::Level::Panic,
            format_args!(
                "{} at {}:{}",
                info.message(),
                location.file(),
                location.line()
            ),
        ),
        None => klog::log(klog::Level::Panic, format_args!("{}", info.message())),
    }

    khal::cpu::halt_forever()
}
