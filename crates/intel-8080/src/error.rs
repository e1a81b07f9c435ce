//! The error taxonomy from §7.

use thiserror::Error;

/// An instruction byte fell into an as-yet-unimplemented encoding.
///
/// Non-fatal per §7: the control unit logs this and advances PC by one
/// rather than propagating it to the caller, so this type never crosses
/// the `Machine` boundary — it exists to give the logged diagnostic a
/// concrete shape instead of an ad hoc format string.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("unimplemented opcode {opcode:#04X} at PC {pc:#06X}")]
pub struct DecodeError {
    pub opcode: u8,
    pub pc: u16,
}

/// A program image was too large to load.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("program image of {len} bytes exceeds the 64 KiB address space")]
    ImageTooLarge { len: usize },
}

/// Panics with a message naming the violated invariant.
///
/// Used at the handful of points §4.5.4 calls "prevented by construction"
/// (at most one read-enable and one write-enable asserted per cycle): if
/// this ever fires, it's a bug in the control unit's phase sequencing, not
/// a condition a caller can recover from.
macro_rules! assert_invariant {
    ($cond:expr, $msg:literal $(, $arg:expr)* $(,)?) => {
        if !$cond {
            panic!(concat!("internal invariant violated: ", $msg) $(, $arg)*);
        }
    };
}

pub(crate) use assert_invariant;
