//! Tape region bounds and reserved register addresses.
//!
//! TASM's four regions are laid end to end in one flat address space; these
//! constants are the only place the boundaries are spelled out numerically.

/// First address of the storage region.
pub const STORAGE_START: u32 = 0;
/// Last address (inclusive) of the storage region.
pub const STORAGE_END: u32 = 99_999;

/// First address of the call-stack region.
pub const STACK_START: u32 = 100_000;
/// Last address (inclusive) of the call-stack region.
pub const STACK_END: u32 = 100_999;

/// First address of the display (output) region.
pub const DISPLAY_START: u32 = 101_000;
/// Last address (inclusive) of the display region.
pub const DISPLAY_END: u32 = 200_999;

/// First address of the instruction region.
pub const INSTRUCTIONS_START: u32 = 201_000;
/// Last address (inclusive) of the instruction region.
pub const INSTRUCTIONS_END: u32 = 300_999;

/// Total number of addressable cells (one past the highest valid address).
pub const TAPE_LEN: usize = (INSTRUCTIONS_END + 1) as usize;

/// Scratch cell available to programs.
pub const TEMP: u32 = 0;
/// Zero flag, set by `cmp`.
pub const ZF: u32 = 1;
/// Carry flag, set by `cmp`.
pub const CF: u32 = 2;
/// Cursor for the next free display cell.
pub const DISP: u32 = 3;
/// Cursor for the next free stack slot.
pub const STK: u32 = 4;
