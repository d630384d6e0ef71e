//! The TASM assembler: a single-pass-emission, two-pass-label-resolution
//! translator from TASM assembly source to a `tasm::Tape` with its
//! instruction region populated and its registers initialized.

pub mod error;
pub mod labels;
pub mod lexer;
pub mod lower;
pub mod operand;
pub mod source_map;

use tasm::constants::*;
use tasm::{Cell, DType, Tape};

pub use error::AssembleError;

use labels::{LabelMap, PendingLabel};
use lexer::{split_line, RawToken};
use source_map::SourceMap;

/// The result of assembling one program: a populated tape and the resolved
/// entry address (the address of label `main`).
pub struct Assembled {
    pub tape: Tape,
    pub entry: u32,
    pub source_map: SourceMap,
}

/// Assembles TASM source text into a tape. `source` is treated as a stream
/// of lines (see spec.md §4.3); the caller is responsible for reading it
/// from wherever it lives (a `.tasm` file, in `tasm-cli`'s case).
pub fn assemble(source: &str) -> Result<Assembled, AssembleError> {
    let mut tape = Tape::new();
    let mut labels = LabelMap::new();
    let mut pending: Vec<PendingLabel> = Vec::new();
    let mut source_map = SourceMap::new();
    let mut addr = INSTRUCTIONS_START;

    for (idx, raw_line) in source.lines().enumerate() {
        let line = idx + 1;
        let tokens = split_line(raw_line).map_err(|detail| AssembleError::MalformedOperand {
            line,
            detail,
        })?;
        if tokens.is_empty() {
            continue;
        }

        let mut tokens = &tokens[..];
        while let Some(RawToken::Word(w)) = tokens.first() {
            let name = match w.strip_suffix(':') {
                Some(name) => name,
                None => break,
            };
            if name.is_empty() {
                return Err(AssembleError::MalformedOperand {
                    line,
                    detail: "empty label name".to_string(),
                });
            }
            labels.define(name.as_bytes(), addr, line)?;
            tokens = &tokens[1..];
        }
        if tokens.is_empty() {
            continue;
        }

        let mnemonic = match &tokens[0] {
            RawToken::Word(w) => w.clone(),
            RawToken::Str(_) => {
                return Err(AssembleError::MalformedOperand {
                    line,
                    detail: "a line cannot start with a string literal".to_string(),
                })
            }
        };
        let operands = &tokens[1..];
        let lowered = lower::lower(&mnemonic, operands, line)?;

        for (i, cell) in lowered.cells.iter().enumerate() {
            let cell_addr = addr + i as u32;
            if cell_addr > INSTRUCTIONS_END {
                return Err(AssembleError::InstructionOverflow { line });
            }
            tape.write(cell_addr, *cell).expect("checked in bounds above");
            source_map.record(cell_addr, line);
        }
        for (offset, label) in lowered.label_refs {
            pending.push(PendingLabel {
                cell_addr: addr + offset as u32,
                label,
                line,
            });
        }
        addr += lowered.cells.len() as u32;
    }

    if addr > INSTRUCTIONS_END {
        return Err(AssembleError::InstructionOverflow {
            line: source.lines().count(),
        });
    }
    tape.write(addr, Cell::bare(tasm::MicroOp::Halt))
        .map_err(|_| AssembleError::InstructionOverflow {
            line: source.lines().count(),
        })?;

    for patch in pending {
        let resolved = labels.resolve(&patch.label, patch.line)?;
        let mut cell = tape.read(patch.cell_addr).expect("patch site in bounds");
        cell.data = resolved;
        tape.write(patch.cell_addr, cell).expect("patch site in bounds");
    }

    let entry = labels.get(b"main").ok_or(AssembleError::MissingMain)?;

    tape.write(DISP, Cell::data(DISPLAY_START, DType::Numeric)).unwrap();
    tape.write(STK, Cell::data(STACK_END, DType::Numeric)).unwrap();
    tape.write(ZF, Cell::data(0, DType::Numeric)).unwrap();
    tape.write(CF, Cell::data(0, DType::Numeric)).unwrap();

    Ok(Assembled {
        tape,
        entry,
        source_map,
    })
}
