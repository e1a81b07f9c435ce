//! Cycle-accurate functional simulator core for the Intel 8080.
//!
//! Five cooperating modules — clock, register file, multiplexer, memory,
//! and control unit — wired the way `emu-core`'s `Bus`/`Cpu`/`Tickable`
//! traits wire any CPU core in this workspace to its bus. [`Machine`] is the
//! entry point; it owns the control unit and memory and exposes `load`,
//! `start`, `stop`, and `reset`.

mod alu;
mod cu;
mod decode;
mod error;
mod flags;
mod machine;
mod memory;
mod mux;
mod registers;

pub use alu::{evaluate, AluOp, AluResult};
pub use cu::ControlUnit;
pub use error::{DecodeError, LoadError};
pub use flags::Flags;
pub use machine::Machine;
pub use memory::Memory;
pub use registers::{RegisterFile, RegisterId, RegisterSnapshot};
