use std::fs::File;
use std::io::{self, Write};

use tasm::{Region, Tape};

const DUMPS: &[(Region, &str)] = &[
    (Region::Storage, "__STORE_DUMP.tasm.txt"),
    (Region::Display, "__DISPLAY_DUMP.tasm.txt"),
    (Region::Instructions, "__INSTRUCTION_DUMP.tasm.txt"),
];

/// Writes the three memory-dump files to the current directory, one line
/// per cell in the matching region.
pub fn write_dumps(tape: &Tape) -> io::Result<()> {
    for (region, filename) in DUMPS {
        let mut file = File::create(filename)?;
        for (addr, cell) in tape.iter_region(*region) {
            writeln!(
                file,
                "0x{addr:08x} [{region}+{offset:010}] 0x{op:x} 0x{data:x} {dtype}",
                addr = addr,
                region = region.name(),
                offset = addr - region.base(),
                op = cell.op.code(),
                data = cell.data,
                dtype = cell.dtype as u32,
            )?;
        }
    }
    Ok(())
}
