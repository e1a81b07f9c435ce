//! The multiplexer: the crossbar between the control unit and the register file.
//!
//! §4.3. The CU only ever addresses a register through `read`/`write` here —
//! it never touches `RegisterFile` cells directly, which is what keeps the
//! feedback loop between CU and register file a one-way call from the
//! scheduler's point of view (see `DESIGN.md`, "cyclic wiring").

use crate::registers::{RegisterFile, RegisterId};

/// Routes a 3-bit selector to one of the seven register-file cells.
///
/// A selector that doesn't decode to a `RegisterId` (i.e. `0b110`, M) is the
/// CU's responsibility to avoid — per §4.3 it "produces no effect" if it
/// reaches the MUX, so `read`/`write` are no-ops for an undecodable code
/// rather than panicking.
#[derive(Debug, Default)]
pub struct Multiplexer;

impl Multiplexer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Assert read-enable for `sel`; returns the routed register's value, or
    /// 0 if `sel` doesn't decode to a register.
    #[must_use]
    pub fn read(&self, registers: &RegisterFile, sel: u8) -> u8 {
        match RegisterId::from_code(sel) {
            Some(id) => {
                let value = registers.read(id);
                log::trace!(target: "intel_8080::mux", "read select {sel:#05b} -> {value:#04X}");
                value
            }
            None => 0,
        }
    }

    /// Assert write-enable for `sel`, routing `value` into the selected
    /// register. A no-op if `sel` doesn't decode to a register.
    pub fn write(&self, registers: &mut RegisterFile, sel: u8, value: u8) {
        if let Some(id) = RegisterId::from_code(sel) {
            log::trace!(target: "intel_8080::mux", "write select {sel:#05b} <- {value:#04X}");
            registers.write(id, value);
        }
    }
}
