//! Structured interrupt dispatch.
//!
//! Every entry stub ends up in the kernel's dispatcher with an
//! [`InterruptFrame`]. This module decides what the interrupt was and renders
//! the report. It never acknowledges anything and never resumes: the caller
//! halts once [`report`] returns.

use core::fmt;

use khal::ChainedPics;

use crate::frame::InterruptFrame;

/// Vector of the general-protection fault.
pub const GENERAL_PROTECTION_VECTOR: u8 = 13;
/// Vector of the page fault.
pub const PAGE_FAULT_VECTOR: u8 = 14;

/// What an interrupt vector means to this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    /// IRQ 0-7, delivered by the master PIC.
    MasterPic { irq: u8 },
    /// IRQ 8-15, delivered by the slave PIC.
    SlavePic { irq: u8 },
    GeneralProtection,
    PageFault,
    /// Anything else: CPU exceptions other than #GP/#PF and stray vectors.
    Unexpected,
}

/// Classify a vector. PIC ranges are those of [`ChainedPics::REMAPPED`].
pub const fn classify(vector: u8) -> InterruptKind {
    match ChainedPics::REMAPPED.irq_for_vector(vector) {
        Some(irq @ 0..=7) => InterruptKind::MasterPic { irq },
        Some(irq) => InterruptKind::SlavePic { irq },
        None => match vector {
            GENERAL_PROTECTION_VECTOR => InterruptKind::GeneralProtection,
            PAGE_FAULT_VECTOR => InterruptKind::PageFault,
            _ => InterruptKind::Unexpected,
        },
    }
}

/// Architectural mnemonic of a CPU exception vector.
pub const fn exception_name(vector: u8) -> Option<&'static str> {
    Some(match vector {
        0 => "#DE divide error",
        1 => "#DB debug",
        2 => "NMI",
        3 => "#BP breakpoint",
        4 => "#OF overflow",
        5 => "#BR bound range exceeded",
        6 => "#UD invalid opcode",
        7 => "#NM device not available",
        8 => "#DF double fault",
        9 => "coprocessor segment overrun",
        10 => "#TS invalid TSS",
        11 => "#NP segment not present",
        12 => "#SS stack-segment fault",
        13 => "#GP general protection",
        14 => "#PF page fault",
        16 => "#MF x87 floating-point",
        17 => "#AC alignment check",
        18 => "#MC machine check",
        19 => "#XM SIMD floating-point",
        20 => "#VE virtualization",
        21 => "#CP control protection",
        28 => "#HV hypervisor injection",
        29 => "#VC VMM communication",
        30 => "#SX security",
        _ => return None,
    })
}

/// One interrupt, ready to be logged.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub kind: InterruptKind,
    pub frame: &'a InterruptFrame,
    /// CR2 at entry; only captured for page faults.
    pub fault_address: Option<u64>,
}

impl<'a> Report<'a> {
    pub fn new(frame: &'a InterruptFrame, fault_address: Option<u64>) -> Self {
        Self {
            kind: classify(frame.vector()),
            frame,
            fault_address,
        }
    }

    /// PIC lines are informational; everything else is an error.
    pub fn level(&self) -> log::Level {
        match self.kind {
            InterruptKind::MasterPic { .. } | InterruptKind::SlavePic { .. } => log::Level::Info,
            _ => log::Level::Error,
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vector = self.frame.vector();
        match self.kind {
            InterruptKind::MasterPic { irq } => write!(f, "pic1 interrupt {vector} (irq {irq})"),
            InterruptKind::SlavePic { irq } => write!(f, "pic2 interrupt {vector} (irq {irq})"),
            InterruptKind::GeneralProtection => write!(f, "general protection fault. {vector}"),
            InterruptKind::PageFault => {
                write!(f, "page fault. {vector}")?;
                if let Some(address) = self.fault_address {
                    write!(f, " at {address:#018x}")?;
                }
                Ok(())
            }
            InterruptKind::Unexpected => {
                write!(f, "unexpected interrupt. {vector}")?;
                if let Some(name) = exception_name(vector) {
                    write!(f, " ({name})")?;
                }
                Ok(())
            }
        }?;
        if let Some(code) = self.frame.error_code() {
            write!(f, " error={code:#x}")?;
        }
        Ok(())
    }
}

/// Log one interrupt and return how it was classified.
///
/// The caller reads CR2 for page faults; [`khal::cpu::fault_address`] must be
/// sampled before anything else can fault.
pub fn report(frame: &InterruptFrame, fault_address: Option<u64>) -> InterruptKind {
    let report = Report::new(frame, fault_address);
    log::log!(report.level(), "{report}");
    log::log!(report.level(), "  {}", frame.ret);
    report.kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ReturnFrame;
    use std::string::{String, ToString};
    use std::sync::Mutex;
    use std::vec::Vec;

    type Lines = Vec<(log::Level, String)>;

    /// Keeps every record `report` emits.
    struct Capture;

    static CAPTURED: Mutex<Lines> = Mutex::new(Vec::new());
    /// Serializes the tests that read `CAPTURED`.
    static SERIAL: Mutex<()> = Mutex::new(());

    impl log::Log for Capture {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if record.target() == "ktrap::dispatch" {
                let line = record.args().to_string();
                CAPTURED.lock().unwrap().push((record.level(), line));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture;

    /// Run `report` on `frame` and return what it logged.
    fn logged(frame: &InterruptFrame, fault_address: Option<u64>) -> (InterruptKind, Lines) {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);
        let _serial = SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        CAPTURED.lock().unwrap().clear();
        let kind = report(frame, fault_address);
        let lines = core::mem::take(&mut *CAPTURED.lock().unwrap());
        (kind, lines)
    }

    const RET: ReturnFrame = ReturnFrame {
        rip: 0xFFFF_FFFF_8000_1234,
        cs: 0x28,
        rflags: 0x202,
        rsp: 0xFFFF_8000_0001_0000,
        ss: 0x30,
    };
    const RET_LINE: &str =
        "  rip=0xffffffff80001234 cs=0x0028 rflags=0x00000202 rsp=0xffff800000010000 ss=0x0030";

    fn frame(vector: u64, error_code: u64) -> InterruptFrame {
        InterruptFrame {
            vector,
            error_code,
            ..InterruptFrame::default()
        }
    }

    #[test]
    fn pic_ranges_split_at_forty() {
        assert_eq!(classify(32), InterruptKind::MasterPic { irq: 0 });
        assert_eq!(classify(39), InterruptKind::MasterPic { irq: 7 });
        assert_eq!(classify(40), InterruptKind::SlavePic { irq: 8 });
        assert_eq!(classify(47), InterruptKind::SlavePic { irq: 15 });
        assert_eq!(classify(48), InterruptKind::Unexpected);
    }

    #[test]
    fn faults_are_named() {
        assert_eq!(classify(13), InterruptKind::GeneralProtection);
        assert_eq!(classify(14), InterruptKind::PageFault);
        assert_eq!(classify(6), InterruptKind::Unexpected);
        assert_eq!(classify(255), InterruptKind::Unexpected);
    }

    #[test]
    fn report_text_distinguishes_kinds() {
        let f = frame(33, 0);
        assert_eq!(Report::new(&f, None).to_string(), "pic1 interrupt 33 (irq 1)");

        let f = frame(13, 0x18);
        assert_eq!(
            Report::new(&f, None).to_string(),
            "general protection fault. 13 error=0x18"
        );

        let f = frame(14, 0x2);
        assert_eq!(
            Report::new(&f, Some(0xdead_b000)).to_string(),
            "page fault. 14 at 0x00000000deadb000 error=0x2"
        );

        let f = frame(6, 0);
        assert_eq!(
            Report::new(&f, None).to_string(),
            "unexpected interrupt. 6 (#UD invalid opcode)"
        );

        let f = frame(200, 0);
        assert_eq!(Report::new(&f, None).to_string(), "unexpected interrupt. 200");
    }

    #[test]
    fn report_logs_classification_then_return_frame() {
        let f = InterruptFrame {
            ret: RET,
            ..frame(14, 0x2)
        };
        let (kind, lines) = logged(&f, Some(0xdead_b000));
        assert_eq!(kind, InterruptKind::PageFault);
        assert_eq!(
            lines,
            [
                (
                    log::Level::Error,
                    "page fault. 14 at 0x00000000deadb000 error=0x2".to_string()
                ),
                (log::Level::Error, RET_LINE.to_string()),
            ]
        );
    }

    #[test]
    fn report_logs_pic_interrupts_at_info() {
        let f = InterruptFrame {
            ret: RET,
            ..frame(41, 0)
        };
        let (kind, lines) = logged(&f, None);
        assert_eq!(kind, InterruptKind::SlavePic { irq: 9 });
        assert_eq!(
            lines,
            [
                (log::Level::Info, "pic2 interrupt 41 (irq 9)".to_string()),
                (log::Level::Info, RET_LINE.to_string()),
            ]
        );
    }

    #[test]
    fn report_logs_unexpected_vectors_as_errors() {
        let f = InterruptFrame {
            ret: RET,
            ..frame(6, 0)
        };
        let (kind, lines) = logged(&f, None);
        assert_eq!(kind, InterruptKind::Unexpected);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|(level, _)| *level == log::Level::Error));
        assert_eq!(lines[0].1, "unexpected interrupt. 6 (#UD invalid opcode)");
        assert_eq!(lines[1].1, RET_LINE);
    }

    #[test]
    fn only_pic_lines_are_informational() {
        assert_eq!(Report::new(&frame(44, 0), None).level(), log::Level::Info);
        assert_eq!(Report::new(&frame(14, 0), None).level(), log::Level::Error);
        assert_eq!(Report::new(&frame(3, 0), None).level(), log::Level::Error);
    }
}
