use std::fmt;

/// Tag distinguishing how a display cell's `data` should be rendered by
/// `OUT`, and how a `put`-loaded literal should be interpreted.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum DType {
    Numeric,
    Character,
}

impl Default for DType {
    fn default() -> DType {
        DType::Numeric
    }
}

/// Addressing-mode tag carried by every instruction-region cell whose `data`
/// names either an address to operate on, or (for `Read`) a value to load.
///
/// This tag is the redesign spec.md §9 licenses in place of the source's
/// self-modifying load-and-patch micro-ops: the executor performs the one
/// extra pointer hop at dispatch time instead of rewriting a downstream
/// cell's operand at runtime.
///
/// For every address-consuming opcode (`Jump`, the conditional jumps,
/// `Write`, `Cmp`, `And`/`Or`/`Xor`, `Not`, `Lshift`/`Rshift`,
/// `Add`/`Sub`/`Mul`/`Div`, `Call`): `Immediate` means `data` *is* the
/// address; `Indirect` means `cell[data].data` is the address (one pointer
/// hop — "the value currently stored at `data`," per the glossary).
///
/// For `Read` specifically the same tag means something adjacent: `Immediate`
/// means `data` *is* the value to load (used for `put`'s literal and string
/// forms); `Indirect` means `data` is an address to fetch the value from
/// (the ordinary load path, used by the `READ a2 ; OP a1` lowering family).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum AddrMode {
    Immediate,
    Indirect,
}

impl Default for AddrMode {
    fn default() -> AddrMode {
        AddrMode::Immediate
    }
}

/// The closed set of micro-opcodes the executor dispatches on.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum MicroOp {
    /// Inert; cursor advances by 1. Never emitted by the assembler's own
    /// lowering (the addressing-mode redesign has no need for literal-holder
    /// cells) but still a first-class opcode the executor must honor.
    None,
    Halt,
    Jump,
    Read,
    Write,
    Cmp,
    Je,
    Jne,
    Jg,
    Jge,
    Jl,
    Jle,
    And,
    Or,
    Xor,
    Not,
    Lshift,
    Rshift,
    Add,
    Sub,
    Mul,
    Div,
    Call,
    Ret,
    Out,
}

impl fmt::Display for MicroOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            MicroOp::None => "NONE",
            MicroOp::Halt => "HALT",
            MicroOp::Jump => "JUMP",
            MicroOp::Read => "READ",
            MicroOp::Write => "WRITE",
            MicroOp::Cmp => "CMP",
            MicroOp::Je => "JE",
            MicroOp::Jne => "JNE",
            MicroOp::Jg => "JG",
            MicroOp::Jge => "JGE",
            MicroOp::Jl => "JL",
            MicroOp::Jle => "JLE",
            MicroOp::And => "AND",
            MicroOp::Or => "OR",
            MicroOp::Xor => "XOR",
            MicroOp::Not => "NOT",
            MicroOp::Lshift => "LSHIFT",
            MicroOp::Rshift => "RSHIFT",
            MicroOp::Add => "ADD",
            MicroOp::Sub => "SUB",
            MicroOp::Mul => "MUL",
            MicroOp::Div => "DIV",
            MicroOp::Call => "CALL",
            MicroOp::Ret => "RET",
            MicroOp::Out => "OUT",
        };
        f.write_str(name)
    }
}

impl MicroOp {
    /// A stable discriminant, used only by the memory-dump hex rendering.
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// One tape unit: an opcode, a 32-bit operand, a display-rendering type tag,
/// and (meaningful only inside the instruction region) an addressing mode.
///
/// # Examples
///
/// ```
/// use tasm::{Cell, MicroOp, DType, AddrMode};
///
/// let c = Cell::data(7, DType::Numeric);
/// assert_eq!(c.op, MicroOp::None);
/// assert_eq!(c.data, 7);
///
/// let c = Cell::instr(MicroOp::Jump, 201_005, AddrMode::Immediate);
/// assert_eq!(c.op, MicroOp::Jump);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Cell {
    pub op: MicroOp,
    pub data: u32,
    pub dtype: DType,
    pub mode: AddrMode,
}

impl Cell {
    /// An inert data cell: `op = NONE`, holding a plain value.
    pub fn data(data: u32, dtype: DType) -> Cell {
        Cell {
            op: MicroOp::None,
            data,
            dtype,
            mode: AddrMode::Immediate,
        }
    }

    /// An instruction cell with an address-role or value-role operand.
    pub fn instr(op: MicroOp, data: u32, mode: AddrMode) -> Cell {
        Cell {
            op,
            data,
            dtype: DType::Numeric,
            mode,
        }
    }

    /// A `Read` cell loading a literal value (used by `put`'s literal/string
    /// forms), tagging the dtype the loaded value should carry.
    pub fn read_literal(value: u32, dtype: DType) -> Cell {
        Cell {
            op: MicroOp::Read,
            data: value,
            dtype,
            mode: AddrMode::Immediate,
        }
    }

    /// A no-operand instruction cell (`Halt`, `Ret`, `Out`).
    pub fn bare(op: MicroOp) -> Cell {
        Cell {
            op,
            data: 0,
            dtype: DType::Numeric,
            mode: AddrMode::Immediate,
        }
    }
}

impl Default for Cell {
    fn default() -> Cell {
        Cell::data(0, DType::Numeric)
    }
}
