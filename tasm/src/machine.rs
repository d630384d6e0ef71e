use std::io::Write as IoWrite;

use crate::cell::{AddrMode, Cell, DType, MicroOp};
use crate::constants::*;
use crate::error::RuntimeError;
use crate::tape::Tape;

/// The machine-wide cursor: current address plus its scratch accumulator.
/// `data`/`dtype` act as a single-register accumulator between `READ` and
/// whatever micro-op consumes it next.
#[derive(Clone, Copy, Debug)]
pub struct Cursor {
    pub pos: u32,
    pub data: u32,
    pub dtype: DType,
}

/// Owns the tape, the cursor, and the halt signal — the single machine
/// context spec.md §9 calls for in place of module-level globals.
pub struct Machine {
    tape: Tape,
    cursor: Cursor,
    halted: bool,
}

impl Machine {
    /// Builds a machine over an already-assembled tape, with the cursor
    /// positioned at `entry` (the resolved address of label `main`). The
    /// DISP/STK/ZF/CF registers are expected to already be populated in
    /// `tape` by the assembler, per spec.md §4.2's "established by the
    /// assembler, not the executor."
    pub fn new(tape: Tape, entry: u32) -> Machine {
        Machine {
            tape,
            cursor: Cursor {
                pos: entry,
                data: 0,
                dtype: DType::Numeric,
            },
            halted: false,
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    fn reg(&self, addr: u32) -> u32 {
        self.tape.read(addr).expect("reserved register in bounds").data
    }

    fn set_reg(&mut self, addr: u32, value: u32) {
        self.tape
            .write(addr, Cell::data(value, DType::Numeric))
            .expect("reserved register in bounds");
    }

    /// Runs the fetch-execute loop to completion, flushing each `OUT` to
    /// `out`. Returns `Ok(())` on `HALT`, or the first `RuntimeError`.
    pub fn run<W: IoWrite>(&mut self, out: &mut W) -> Result<(), RuntimeError> {
        while !self.halted {
            self.step(out)?;
        }
        Ok(())
    }

    fn step<W: IoWrite>(&mut self, out: &mut W) -> Result<(), RuntimeError> {
        if self.cursor.pos > INSTRUCTIONS_END {
            return Err(RuntimeError::OutOfBounds { addr: self.cursor.pos });
        }
        let pos = self.cursor.pos;
        let cell = self.tape.read(pos)?;

        // The source's blanket pre-dispatch check: the raw operand field is
        // validated against the instruction region's upper bound before
        // dispatch, uniformly across every opcode (including ones, like
        // NONE, with no address-role operand).
        if cell.data > INSTRUCTIONS_END {
            return Err(RuntimeError::OutOfBounds { addr: cell.data });
        }

        match cell.op {
            MicroOp::None => {
                self.cursor.pos = pos + 1;
            }
            MicroOp::Halt => {
                self.halted = true;
            }
            MicroOp::Jump => {
                self.cursor.pos = self.effective_addr(cell)?;
            }
            MicroOp::Read => {
                let (data, dtype) = match cell.mode {
                    AddrMode::Immediate => (cell.data, cell.dtype),
                    AddrMode::Indirect => {
                        let src = self.tape.read(cell.data)?;
                        (src.data, src.dtype)
                    }
                };
                self.cursor.data = data;
                self.cursor.dtype = dtype;
                self.cursor.pos = pos + 1;
            }
            MicroOp::Write => {
                let addr = self.effective_addr(cell)?;
                self.tape
                    .write(addr, Cell::data(self.cursor.data, self.cursor.dtype))?;
                if let Ok(crate::tape::Region::Display) = self.tape.region_of(addr) {
                    if addr >= self.reg(DISP) {
                        self.set_reg(DISP, addr + 1);
                    }
                }
                self.cursor.pos = pos + 1;
            }
            MicroOp::Cmp => {
                let addr = self.effective_addr(cell)?;
                let lhs = self.tape.read(addr)?.data;
                self.set_reg(ZF, (lhs == self.cursor.data) as u32);
                self.set_reg(CF, (lhs < self.cursor.data) as u32);
                self.cursor.pos = pos + 1;
            }
            MicroOp::Je | MicroOp::Jne | MicroOp::Jg | MicroOp::Jge | MicroOp::Jl | MicroOp::Jle => {
                let zf = self.reg(ZF) != 0;
                let cf = self.reg(CF) != 0;
                let taken = match cell.op {
                    MicroOp::Je => zf,
                    MicroOp::Jne => !zf,
                    MicroOp::Jg => !zf && !cf,
                    MicroOp::Jge => !cf,
                    MicroOp::Jl => cf,
                    MicroOp::Jle => zf || cf,
                    _ => unreachable!(),
                };
                if taken {
                    self.cursor.pos = self.effective_addr(cell)?;
                } else {
                    self.cursor.pos = pos + 1;
                }
            }
            MicroOp::And | MicroOp::Or | MicroOp::Xor => {
                let addr = self.effective_addr(cell)?;
                let lhs = self.tape.read(addr)?;
                let result = match cell.op {
                    MicroOp::And => lhs.data & self.cursor.data,
                    MicroOp::Or => lhs.data | self.cursor.data,
                    MicroOp::Xor => lhs.data ^ self.cursor.data,
                    _ => unreachable!(),
                };
                self.tape.write(addr, Cell::data(result, lhs.dtype))?;
                self.cursor.pos = pos + 1;
            }
            MicroOp::Not => {
                let addr = self.effective_addr(cell)?;
                let lhs = self.tape.read(addr)?;
                let result = if lhs.data == 0 { 1 } else { 0 };
                self.tape.write(addr, Cell::data(result, lhs.dtype))?;
                self.cursor.pos = pos + 1;
            }
            MicroOp::Lshift | MicroOp::Rshift => {
                let addr = self.effective_addr(cell)?;
                let lhs = self.tape.read(addr)?;
                let shift = self.cursor.data & 0x1f;
                let result = match cell.op {
                    MicroOp::Lshift => lhs.data.wrapping_shl(shift),
                    MicroOp::Rshift => lhs.data.wrapping_shr(shift),
                    _ => unreachable!(),
                };
                self.tape.write(addr, Cell::data(result, lhs.dtype))?;
                self.cursor.pos = pos + 1;
            }
            MicroOp::Add | MicroOp::Sub | MicroOp::Mul | MicroOp::Div => {
                let addr = self.effective_addr(cell)?;
                let lhs = self.tape.read(addr)?;
                let result = match cell.op {
                    MicroOp::Add => lhs.data.wrapping_add(self.cursor.data),
                    MicroOp::Sub => lhs.data.wrapping_sub(self.cursor.data),
                    MicroOp::Mul => lhs.data.wrapping_mul(self.cursor.data),
                    MicroOp::Div => {
                        if self.cursor.data == 0 {
                            return Err(RuntimeError::ArithmeticError { addr: pos });
                        }
                        lhs.data.wrapping_div(self.cursor.data)
                    }
                    _ => unreachable!(),
                };
                self.tape.write(addr, Cell::data(result, lhs.dtype))?;
                self.cursor.pos = pos + 1;
            }
            MicroOp::Call => {
                let target = self.effective_addr(cell)?;
                let stk = self.reg(STK);
                if stk == STACK_START {
                    return Err(RuntimeError::StackOverflow { addr: pos });
                }
                self.tape.write(stk, Cell::data(pos + 1, DType::Numeric))?;
                self.set_reg(STK, stk - 1);
                self.cursor.pos = target;
            }
            MicroOp::Ret => {
                let stk = self.reg(STK) + 1;
                if stk > STACK_END {
                    return Err(RuntimeError::StackUnderflow { addr: pos });
                }
                self.set_reg(STK, stk);
                self.cursor.pos = self.tape.read(stk)?.data;
            }
            MicroOp::Out => {
                self.flush_display(out);
                self.cursor.pos = pos + 1;
            }
        }
        Ok(())
    }

    /// Resolves an address-role operand per the cell's addressing mode.
    fn effective_addr(&self, cell: Cell) -> Result<u32, RuntimeError> {
        match cell.mode {
            AddrMode::Immediate => Ok(cell.data),
            AddrMode::Indirect => Ok(self.tape.read(cell.data)?.data),
        }
    }

    /// Renders the live portion of the display region to `out`, exactly as
    /// spec.md §4.2 describes: non-destructive, escape-decoding, leaving the
    /// cursor restored to just past the `OUT` instruction afterward.
    fn flush_display<W: IoWrite>(&self, out: &mut W) {
        let disp = self.reg(DISP);
        let mut pos = DISPLAY_START;
        while pos < DISPLAY_END && pos < disp {
            let cell = self.tape.read(pos).expect("display cell in bounds");
            match cell.dtype {
                DType::Character => {
                    let byte = (cell.data & 0xFF) as u8;
                    if byte == b'\\' && pos + 1 < disp {
                        let next = self.tape.read(pos + 1).expect("display cell in bounds");
                        let decoded = (next.data & 0xFF) as u8;
                        match decoded {
                            b'n' => {
                                let _ = out.write_all(b"\n");
                            }
                            b'r' => {
                                let _ = out.write_all(b"\r");
                            }
                            _ => {}
                        }
                        pos += 2;
                        continue;
                    }
                    let _ = out.write_all(&[byte]);
                }
                DType::Numeric => {
                    let _ = write!(out, "{}", cell.data);
                }
            }
            pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Cell;

    fn fresh_tape() -> Tape {
        let mut tape = Tape::new();
        tape.write(DISP, Cell::data(DISPLAY_START, DType::Numeric)).unwrap();
        tape.write(STK, Cell::data(STACK_END, DType::Numeric)).unwrap();
        tape.write(ZF, Cell::data(0, DType::Numeric)).unwrap();
        tape.write(CF, Cell::data(0, DType::Numeric)).unwrap();
        tape
    }

    #[test]
    fn halt_stops_the_loop() {
        let mut tape = fresh_tape();
        tape.write(INSTRUCTIONS_START, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, INSTRUCTIONS_START);
        let mut out = Vec::new();
        m.run(&mut out).unwrap();
        assert_eq!(m.cursor().pos, INSTRUCTIONS_START);
    }

    #[test]
    fn read_write_moves_a_value_between_cells() {
        let mut tape = fresh_tape();
        tape.write(0x10, Cell::data(99, DType::Numeric)).unwrap();
        let entry = INSTRUCTIONS_START;
        tape.write(entry, Cell::instr(MicroOp::Read, 0x10, AddrMode::Indirect)).unwrap();
        tape.write(entry + 1, Cell::instr(MicroOp::Write, 0x11, AddrMode::Immediate)).unwrap();
        tape.write(entry + 2, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.run(&mut Vec::new()).unwrap();
        assert_eq!(m.tape().read(0x11).unwrap().data, 99);
    }

    #[test]
    fn add_is_wrapping_unsigned() {
        let mut tape = fresh_tape();
        tape.write(0x10, Cell::data(u32::MAX, DType::Numeric)).unwrap();
        let entry = INSTRUCTIONS_START;
        tape.write(entry, Cell::instr(MicroOp::Read, 2, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::instr(MicroOp::Add, 0x10, AddrMode::Immediate)).unwrap();
        tape.write(entry + 2, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.run(&mut Vec::new()).unwrap();
        assert_eq!(m.tape().read(0x10).unwrap().data, 1);
    }

    #[test]
    fn div_by_zero_is_an_arithmetic_error() {
        let mut tape = fresh_tape();
        tape.write(0x10, Cell::data(4, DType::Numeric)).unwrap();
        let entry = INSTRUCTIONS_START;
        tape.write(entry, Cell::instr(MicroOp::Read, 0, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::instr(MicroOp::Div, 0x10, AddrMode::Immediate)).unwrap();
        let mut m = Machine::new(tape, entry);
        let err = m.run(&mut Vec::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::ArithmeticError { .. }));
    }

    #[test]
    fn not_is_logical_not_not_bitwise() {
        let mut tape = fresh_tape();
        tape.write(0x10, Cell::data(0, DType::Numeric)).unwrap();
        let entry = INSTRUCTIONS_START;
        tape.write(entry, Cell::instr(MicroOp::Not, 0x10, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.run(&mut Vec::new()).unwrap();
        assert_eq!(m.tape().read(0x10).unwrap().data, 1);
    }

    #[test]
    fn call_then_ret_restores_stk() {
        let mut tape = fresh_tape();
        let entry = INSTRUCTIONS_START;
        let sub = entry + 10;
        tape.write(entry, Cell::instr(MicroOp::Call, sub, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::bare(MicroOp::Halt)).unwrap();
        tape.write(sub, Cell::bare(MicroOp::Ret)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.run(&mut Vec::new()).unwrap();
        assert_eq!(m.tape().read(STK).unwrap().data, STACK_END);
    }

    #[test]
    fn non_control_flow_ops_advance_pos_by_one() {
        let mut tape = fresh_tape();
        tape.write(0x10, Cell::data(5, DType::Numeric)).unwrap();
        let entry = INSTRUCTIONS_START;
        tape.write(entry, Cell::instr(MicroOp::Not, 0x10, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.step(&mut Vec::new()).unwrap();
        assert_eq!(m.cursor().pos, entry + 1);
    }

    #[test]
    fn disp_advances_only_on_writes_at_or_past_it_in_the_display_region() {
        let mut tape = fresh_tape();
        let entry = INSTRUCTIONS_START;
        // A write below the display region must not move DISP.
        tape.write(entry, Cell::instr(MicroOp::Read, 1, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::instr(MicroOp::Write, 0x20, AddrMode::Immediate)).unwrap();
        // Then a write at the current DISP does advance it.
        tape.write(entry + 2, Cell::instr(MicroOp::Read, 2, AddrMode::Immediate)).unwrap();
        tape.write(
            entry + 3,
            Cell::instr(MicroOp::Write, DISPLAY_START, AddrMode::Immediate),
        )
        .unwrap();
        tape.write(entry + 4, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.run(&mut Vec::new()).unwrap();
        assert_eq!(m.tape().read(DISP).unwrap().data, DISPLAY_START + 1);
    }

    #[test]
    fn cmp_truth_table_matches_x_y_ordering() {
        let case = |x: u32, y: u32| -> (u32, u32) {
            let mut tape = fresh_tape();
            tape.write(0x10, Cell::data(x, DType::Numeric)).unwrap();
            let entry = INSTRUCTIONS_START;
            tape.write(entry, Cell::instr(MicroOp::Read, y, AddrMode::Immediate)).unwrap();
            tape.write(entry + 1, Cell::instr(MicroOp::Cmp, 0x10, AddrMode::Immediate)).unwrap();
            tape.write(entry + 2, Cell::bare(MicroOp::Halt)).unwrap();
            let mut m = Machine::new(tape, entry);
            m.run(&mut Vec::new()).unwrap();
            (
                m.tape().read(ZF).unwrap().data,
                m.tape().read(CF).unwrap().data,
            )
        };
        assert_eq!(case(5, 5), (1, 0));
        assert_eq!(case(3, 9), (0, 1));
        assert_eq!(case(9, 3), (0, 0));
    }

    #[test]
    fn nested_call_ret_leaves_stk_balanced() {
        let mut tape = fresh_tape();
        let entry = INSTRUCTIONS_START;
        let inner = entry + 20;
        let outer = entry + 10;
        tape.write(entry, Cell::instr(MicroOp::Call, outer, AddrMode::Immediate)).unwrap();
        tape.write(entry + 1, Cell::bare(MicroOp::Halt)).unwrap();
        tape.write(outer, Cell::instr(MicroOp::Call, inner, AddrMode::Immediate)).unwrap();
        tape.write(outer + 1, Cell::bare(MicroOp::Ret)).unwrap();
        tape.write(inner, Cell::bare(MicroOp::Ret)).unwrap();
        let mut m = Machine::new(tape, entry);
        m.run(&mut Vec::new()).unwrap();
        assert_eq!(m.tape().read(STK).unwrap().data, STACK_END);
    }

    #[test]
    fn out_decodes_newline_escape_and_is_non_destructive() {
        let mut tape = fresh_tape();
        tape.write(DISPLAY_START, Cell::data(b'H' as u32, DType::Character)).unwrap();
        tape.write(DISPLAY_START + 1, Cell::data(b'\\' as u32, DType::Character)).unwrap();
        tape.write(DISPLAY_START + 2, Cell::data(b'n' as u32, DType::Character)).unwrap();
        tape.write(DISP, Cell::data(DISPLAY_START + 3, DType::Numeric)).unwrap();
        let entry = INSTRUCTIONS_START;
        tape.write(entry, Cell::bare(MicroOp::Out)).unwrap();
        tape.write(entry + 1, Cell::bare(MicroOp::Out)).unwrap();
        tape.write(entry + 2, Cell::bare(MicroOp::Halt)).unwrap();
        let mut m = Machine::new(tape, entry);
        let mut out = Vec::new();
        m.run(&mut out).unwrap();
        assert_eq!(out, b"H\nH\n");
    }
}
