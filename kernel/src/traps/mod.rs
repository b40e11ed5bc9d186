//! Interrupt entry.
//!
//! The stubs and the dispatcher they call live in [`stubs`]; building and
//! loading the table is done by [`install`].

mod stubs;

use khal::DescriptorTableRegister;
use khal::dtr;
use ktrap::Idt;
use spin::Once;

static IDT: Once<Idt> = Once::new();

/// Point all 256 vectors at their stubs and load IDTR.
///
/// Gates use the code selector we are currently running with. Returns the
/// IDTR value that was loaded.
pub fn install() -> DescriptorTableRegister {
    let idt = IDT.call_once(|| {
        let mut idt = Idt::new();
        idt.populate(stubs::stub_table(), dtr::code_selector());
        idt
    });
    idt.load()
}
