#[macro_use]
extern crate clap;

use std::fs;
use std::io;
use std::path::Path;
use std::process;

use clap::Arg;

mod memdump;

#[derive(Debug)]
enum Error {
    BadExtension,
    Io(io::Error),
    Assemble(tasm_asm::AssembleError),
    Runtime(tasm::RuntimeError, Option<usize>),
}

impl From<tasm_asm::AssembleError> for Error {
    fn from(err: tasm_asm::AssembleError) -> Error {
        Error::Assemble(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadExtension => write!(f, "source file must have a .tasm extension"),
            Error::Io(e) => write!(f, "{}", e),
            Error::Assemble(e) => write!(f, "{}", e),
            Error::Runtime(e, None) => write!(f, "{}", e),
            Error::Runtime(e, Some(line)) => write!(f, "{} (source line {})", e, line),
        }
    }
}

/// The address a `RuntimeError` cites, for looking its source line back up
/// in the assembler's source map.
fn runtime_fault_addr(err: &tasm::RuntimeError) -> u32 {
    match *err {
        tasm::RuntimeError::OutOfBounds { addr }
        | tasm::RuntimeError::InvalidInstruction { addr }
        | tasm::RuntimeError::StackOverflow { addr }
        | tasm::RuntimeError::StackUnderflow { addr }
        | tasm::RuntimeError::ArithmeticError { addr } => addr,
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("PATH")
                .help("The .tasm source file to assemble and run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("memdump")
                .long("memdump")
                .help("Write __STORE_DUMP.tasm.txt, __DISPLAY_DUMP.tasm.txt and __INSTRUCTION_DUMP.tasm.txt after execution"),
        )
        .get_matches();

    let path = matches.value_of("PATH").unwrap();
    let want_dump = matches.is_present("memdump");

    if let Err(err) = run(path, want_dump) {
        match err {
            Error::Assemble(_) | Error::BadExtension | Error::Io(_) => {
                eprintln!("ERROR: {}", err);
            }
            Error::Runtime(..) => {
                eprintln!("RUNTIME ERROR: {}", err);
            }
        }
        process::exit(1);
    }
}

fn run(path: &str, want_dump: bool) -> Result<(), Error> {
    if Path::new(path).extension().and_then(|e| e.to_str()) != Some("tasm") {
        return Err(Error::BadExtension);
    }

    let source = fs::read_to_string(path).map_err(|_| {
        tasm_asm::AssembleError::FileNotFound {
            path: path.to_string(),
        }
    })?;
    let assembled = tasm_asm::assemble(&source)?;
    let source_map = assembled.source_map;

    let mut machine = tasm::Machine::new(assembled.tape, assembled.entry);
    let run_result = machine.run(&mut io::stdout());

    if want_dump {
        memdump::write_dumps(machine.tape()).map_err(Error::Io)?;
    }

    run_result.map_err(|err| {
        let line = source_map.line_for(runtime_fault_addr(&err));
        Error::Runtime(err, line)
    })
}
