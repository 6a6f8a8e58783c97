//! Core of the shk emulator: machine state, instruction decoding, opcode
//! semantics, and the interactive debugger. `main.rs` is a thin CLI shell
//! around this crate so the core can be exercised directly from tests.

pub mod cpu;
pub mod error;
pub mod loader;
