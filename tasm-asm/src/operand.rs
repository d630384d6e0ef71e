use crate::error::AssembleError;
use crate::lexer::{parse_uint, RawToken};

/// The first operand, in the form the grammar allows for it: an immediate
/// address, a dereferenced (indirect) address, or a label reference
/// (resolved against the label table, only valid for `jmp`/`call`/the
/// conditional jumps).
pub enum Operand1 {
    Direct(u32),
    Indirect(u32),
    Label(Vec<u8>),
}

/// The second operand, before a mnemonic gives it meaning. Bracketed forms
/// always denote a dereferenced address; bare numeric forms are either an
/// address (the `READ a2 ; OP a1` family) or a literal value (`put`'s single-
/// value form) depending on which mnemonic is lowering it — see
/// `SPEC_FULL.md` §4.3's resolved-ambiguity note.
pub enum Operand2 {
    Bracket(u32),
    Bare(u32),
    Str(Vec<u8>),
}

fn word_text(token: &RawToken, line: usize) -> Result<&str, AssembleError> {
    match token {
        RawToken::Word(w) => Ok(w.as_str()),
        RawToken::Str(_) => Err(AssembleError::MalformedOperand {
            line,
            detail: "a string literal is not valid here".to_string(),
        }),
    }
}

pub fn parse_operand1(token: &RawToken, line: usize) -> Result<Operand1, AssembleError> {
    let text = word_text(token, line)?;
    if let Some(inner) = text.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let value = parse_uint(inner).ok_or_else(|| AssembleError::MalformedOperand {
            line,
            detail: format!("'{}' is not a valid dereferenced address", text),
        })?;
        return Ok(Operand1::Indirect(value));
    }
    if text.starts_with("0x") || text.starts_with("0X") {
        let value = parse_uint(text).ok_or_else(|| AssembleError::MalformedOperand {
            line,
            detail: format!("'{}' is not a valid hexadecimal address", text),
        })?;
        return Ok(Operand1::Direct(value));
    }
    Ok(Operand1::Label(text.as_bytes().to_vec()))
}

pub fn parse_operand2(token: &RawToken, line: usize) -> Result<Operand2, AssembleError> {
    match token {
        RawToken::Str(s) => Ok(Operand2::Str(s.clone())),
        RawToken::Word(text) => {
            if let Some(inner) = text.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                let value = parse_uint(inner).ok_or_else(|| AssembleError::MalformedOperand {
                    line,
                    detail: format!("'{}' is not a valid dereferenced address", text),
                })?;
                return Ok(Operand2::Bracket(value));
            }
            let value = parse_uint(text).ok_or_else(|| AssembleError::MalformedOperand {
                line,
                detail: format!("'{}' is not a valid immediate operand", text),
            })?;
            Ok(Operand2::Bare(value))
        }
    }
}
