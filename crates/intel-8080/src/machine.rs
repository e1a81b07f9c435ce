//! Top-level processor container (§6 external interfaces).

use emu_core::{Cpu, MasterClock, Observable, Value};

use crate::cu::ControlUnit;
use crate::error::LoadError;
use crate::memory::{self, Memory};

const LOG_TARGET: &str = "intel_8080::machine";

/// The 2 MHz master clock all timing in this simulator derives from (§1).
const CLOCK_FREQUENCY_HZ: u64 = 2_000_000;

/// A cap on how many ticks `start()` will run before giving up on an
/// unbounded program, the in-process analogue of §5's wall-clock harness
/// timeout. Not part of the ISA or the timing model — purely a guard
/// against a test or caller hanging forever on a program that never HLTs.
const DEFAULT_TICK_BUDGET: u64 = 1_000_000;

/// Wires together the control unit and memory, the way `processor.hpp`
/// wires the register, memory, MUX, CU, and ALU modules into one unit.
pub struct Machine {
    cu: ControlUnit,
    memory: Memory,
    clock: MasterClock,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            cu: ControlUnit::new(),
            memory: Memory::new(),
            clock: MasterClock::new(CLOCK_FREQUENCY_HZ),
        }
    }

    #[must_use]
    pub const fn clock(&self) -> MasterClock {
        self.clock
    }

    #[must_use]
    pub const fn cu(&self) -> &ControlUnit {
        &self.cu
    }

    #[must_use]
    pub fn memory_at(&self, addr: u16) -> u8 {
        self.memory.read(addr)
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.cu.is_halted()
    }

    #[must_use]
    pub fn pc(&self) -> u32 {
        self.cu.pc()
    }

    /// Reset all state (CU registers, PC, SP, flags, halted bit, and
    /// memory) to zero (§4.5.3).
    pub fn reset(&mut self) {
        self.cu.reset();
        self.memory.reset();
    }

    /// Load a program image at offset 0. Rejects images larger than the
    /// 64 KiB address space without partially loading (§7 `LoadError`).
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > memory::SIZE {
            return Err(LoadError::ImageTooLarge { len: image.len() });
        }
        self.memory.load(image);
        Ok(())
    }

    /// Advance one simulated clock cycle.
    pub fn tick(&mut self) {
        self.cu.tick(&mut self.memory);
    }

    /// Run until halted, with no cycle ceiling beyond the internal guard
    /// against a runaway program (§5 `start()`).
    pub fn start(&mut self) {
        self.start_bounded(DEFAULT_TICK_BUDGET);
    }

    /// Run for at most `max_ticks` simulated cycles, stopping early if the
    /// CPU halts (§5 `start(duration)`).
    pub fn start_bounded(&mut self, max_ticks: u64) {
        for _ in 0..max_ticks {
            if self.cu.is_halted() {
                return;
            }
            self.tick();
        }
        if !self.cu.is_halted() {
            log::warn!(target: LOG_TARGET, "program did not halt within {max_ticks} cycles");
        }
    }

    /// Abort the run immediately by forcing the halted state (§5 `stop()`).
    pub fn stop(&mut self) {
        self.cu.force_halt();
    }
}

impl Observable for Machine {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(Value::U32(self.cu.pc())),
            "sp" => Some(Value::U16(self.cu.sp())),
            "halted" => Some(Value::Bool(self.cu.is_halted())),
            "flags" => Some(Value::U8(self.cu.flags().0)),
            "flags.zero" => Some(Value::Bool(self.cu.flags().zero())),
            "flags.carry" => Some(Value::Bool(self.cu.flags().carry())),
            "flags.sign" => Some(Value::Bool(self.cu.flags().sign())),
            "flags.parity" => Some(Value::Bool(self.cu.flags().parity())),
            "flags.aux_carry" => Some(Value::Bool(self.cu.flags().aux_carry())),
            "registers.a" => Some(Value::U8(self.cu.registers().a)),
            "registers.b" => Some(Value::U8(self.cu.registers().b)),
            "registers.c" => Some(Value::U8(self.cu.registers().c)),
            "registers.d" => Some(Value::U8(self.cu.registers().d)),
            "registers.e" => Some(Value::U8(self.cu.registers().e)),
            "registers.h" => Some(Value::U8(self.cu.registers().h)),
            "registers.l" => Some(Value::U8(self.cu.registers().l)),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "sp",
            "halted",
            "flags",
            "flags.zero",
            "flags.carry",
            "flags.sign",
            "flags.parity",
            "flags.aux_carry",
            "registers.a",
            "registers.b",
            "registers.c",
            "registers.d",
            "registers.e",
            "registers.h",
            "registers.l",
        ]
    }
}
