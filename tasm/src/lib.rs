//! The TASM tape machine: a flat, region-partitioned tape of cells and the
//! micro-op executor that steps over it. See `tasm-asm` for the assembler
//! that lowers TASM assembly source into the instruction region this crate
//! executes.

pub mod cell;
pub mod constants;
pub mod error;
pub mod machine;
pub mod tape;

pub use cell::{AddrMode, Cell, DType, MicroOp};
pub use error::RuntimeError;
pub use machine::{Cursor, Machine};
pub use tape::{Region, Tape};
