use tasm::{AddrMode, Cell, DType, MicroOp};

use crate::error::AssembleError;
use crate::lexer::RawToken;
use crate::operand::{parse_operand1, parse_operand2, Operand1, Operand2};

/// The micro-op cells one assembly line lowers to, plus any label
/// references it couldn't resolve immediately (forward references,
/// deferred to the patch pass).
pub struct Lowered {
    pub cells: Vec<Cell>,
    /// (index into `cells`, label name) — the cell's `data` field is patched
    /// with the label's resolved address once the whole source is known.
    pub label_refs: Vec<(usize, Vec<u8>)>,
}

impl Lowered {
    fn single(cell: Cell) -> Lowered {
        Lowered {
            cells: vec![cell],
            label_refs: Vec::new(),
        }
    }
}

/// First operand that may, for branch/call mnemonics, also be a label.
/// Addresses resolve immediately; labels are deferred to the patch pass.
fn addr_or_label(op1: Operand1, op: MicroOp) -> (Cell, Option<Vec<u8>>) {
    match op1 {
        Operand1::Direct(v) => (Cell::instr(op, v, AddrMode::Immediate), None),
        Operand1::Indirect(v) => (Cell::instr(op, v, AddrMode::Indirect), None),
        Operand1::Label(name) => (Cell::instr(op, 0, AddrMode::Immediate), Some(name)),
    }
}

/// First operand in a data-addressing context: labels are not meaningful
/// here (spec.md §4.3 restricts bare identifiers to `call`/`jmp`/conditional
/// jump targets).
fn addr_only(op1: Operand1, line: usize) -> Result<(u32, AddrMode), AssembleError> {
    match op1 {
        Operand1::Direct(v) => Ok((v, AddrMode::Immediate)),
        Operand1::Indirect(v) => Ok((v, AddrMode::Indirect)),
        Operand1::Label(name) => Err(AssembleError::MalformedOperand {
            line,
            detail: format!(
                "label \"{}\" is not valid as a data address",
                String::from_utf8_lossy(&name)
            ),
        }),
    }
}

/// Lowers one parsed instruction line into its fixed micro-op sequence.
pub fn lower(mnemonic: &str, operands: &[RawToken], line: usize) -> Result<Lowered, AssembleError> {
    let need = |n: usize| -> Result<(), AssembleError> {
        if operands.len() != n {
            return Err(AssembleError::MalformedOperand {
                line,
                detail: format!(
                    "\"{}\" takes {} operand(s), got {}",
                    mnemonic,
                    n,
                    operands.len()
                ),
            });
        }
        Ok(())
    };

    match mnemonic {
        "hlt" => {
            need(0)?;
            Ok(Lowered::single(Cell::bare(MicroOp::Halt)))
        }
        "out" => {
            need(0)?;
            Ok(Lowered::single(Cell::bare(MicroOp::Out)))
        }
        "ret" => {
            need(0)?;
            Ok(Lowered::single(Cell::bare(MicroOp::Ret)))
        }
        "not" => {
            need(1)?;
            let (addr, mode) = addr_only(parse_operand1(&operands[0], line)?, line)?;
            Ok(Lowered::single(Cell::instr(MicroOp::Not, addr, mode)))
        }
        "jmp" | "call" | "je" | "jne" | "jg" | "jge" | "jl" | "jle" => {
            need(1)?;
            let op = match mnemonic {
                "jmp" => MicroOp::Jump,
                "call" => MicroOp::Call,
                "je" => MicroOp::Je,
                "jne" => MicroOp::Jne,
                "jg" => MicroOp::Jg,
                "jge" => MicroOp::Jge,
                "jl" => MicroOp::Jl,
                "jle" => MicroOp::Jle,
                _ => unreachable!(),
            };
            let (cell, label) = addr_or_label(parse_operand1(&operands[0], line)?, op);
            let mut label_refs = Vec::new();
            if let Some(name) = label {
                label_refs.push((0, name));
            }
            Ok(Lowered {
                cells: vec![cell],
                label_refs,
            })
        }
        "cmp" | "mov" | "and" | "or" | "xor" | "lsh" | "rsh" | "add" | "sub" | "mul" | "div" => {
            need(2)?;
            let (a1_addr, a1_mode) = addr_only(parse_operand1(&operands[0], line)?, line)?;
            let a2_addr = match parse_operand2(&operands[1], line)? {
                Operand2::Bracket(v) | Operand2::Bare(v) => v,
                Operand2::Str(_) => {
                    return Err(AssembleError::MalformedOperand {
                        line,
                        detail: format!("\"{}\" does not take a string operand", mnemonic),
                    })
                }
            };
            let op = match mnemonic {
                "cmp" => MicroOp::Cmp,
                "mov" => MicroOp::Write,
                "and" => MicroOp::And,
                "or" => MicroOp::Or,
                "xor" => MicroOp::Xor,
                "lsh" => MicroOp::Lshift,
                "rsh" => MicroOp::Rshift,
                "add" => MicroOp::Add,
                "sub" => MicroOp::Sub,
                "mul" => MicroOp::Mul,
                "div" => MicroOp::Div,
                _ => unreachable!(),
            };
            Ok(Lowered {
                cells: vec![
                    Cell::instr(MicroOp::Read, a2_addr, AddrMode::Indirect),
                    Cell::instr(op, a1_addr, a1_mode),
                ],
                label_refs: Vec::new(),
            })
        }
        "put" => {
            need(2)?;
            let (a1_addr, a1_mode) = addr_only(parse_operand1(&operands[0], line)?, line)?;
            match parse_operand2(&operands[1], line)? {
                Operand2::Bare(v) => Ok(Lowered {
                    cells: vec![
                        Cell::read_literal(v, DType::Numeric),
                        Cell::instr(MicroOp::Write, a1_addr, a1_mode),
                    ],
                    label_refs: Vec::new(),
                }),
                Operand2::Bracket(v) => Ok(Lowered {
                    cells: vec![
                        Cell::instr(MicroOp::Read, v, AddrMode::Indirect),
                        Cell::instr(MicroOp::Write, a1_addr, a1_mode),
                    ],
                    label_refs: Vec::new(),
                }),
                Operand2::Str(bytes) => {
                    let mut cells = Vec::with_capacity(bytes.len() * 2);
                    for (i, byte) in bytes.iter().enumerate() {
                        cells.push(Cell::read_literal(*byte as u32, DType::Character));
                        cells.push(Cell::instr(
                            MicroOp::Write,
                            a1_addr + i as u32,
                            a1_mode,
                        ));
                    }
                    Ok(Lowered {
                        cells,
                        label_refs: Vec::new(),
                    })
                }
            }
        }
        _ => Err(AssembleError::MalformedOperand {
            line,
            detail: format!("unknown mnemonic \"{}\"", mnemonic),
        }),
    }
}
