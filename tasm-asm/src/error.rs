use std::fmt;

/// Assembly-time failures, one variant per spec.md §7's taxonomy. Every
/// variant carries the offending source line number, per the error policy.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AssembleError {
    FileNotFound { path: String },
    DuplicateLabel { line: usize, label: Vec<u8> },
    UndefinedLabel { line: usize, label: Vec<u8> },
    MissingMain,
    MalformedOperand { line: usize, detail: String },
    InstructionOverflow { line: usize },
}

impl fmt::Display for AssembleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AssembleError::FileNotFound { path } => write!(f, "file not found: {}", path),
            AssembleError::DuplicateLabel { line, label } => write!(
                f,
                "line {}: label \"{}\" is already defined",
                line,
                String::from_utf8_lossy(label)
            ),
            AssembleError::UndefinedLabel { line, label } => write!(
                f,
                "line {}: undefined label \"{}\"",
                line,
                String::from_utf8_lossy(label)
            ),
            AssembleError::MissingMain => write!(f, "no \"main\" label defined"),
            AssembleError::MalformedOperand { line, detail } => {
                write!(f, "line {}: malformed operand ({})", line, detail)
            }
            AssembleError::InstructionOverflow { line } => {
                write!(f, "line {}: instruction region overflow", line)
            }
        }
    }
}

impl std::error::Error for AssembleError {}
