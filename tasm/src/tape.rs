use crate::cell::Cell;
use crate::constants::*;
use crate::error::RuntimeError;

/// One of the four contiguous tape partitions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Region {
    Storage,
    Stack,
    Display,
    Instructions,
}

impl Region {
    /// The region containing `addr`, or `None` if `addr` is out of bounds.
    pub fn of(addr: u32) -> Option<Region> {
        match addr {
            STORAGE_START..=STORAGE_END => Some(Region::Storage),
            STACK_START..=STACK_END => Some(Region::Stack),
            DISPLAY_START..=DISPLAY_END => Some(Region::Display),
            INSTRUCTIONS_START..=INSTRUCTIONS_END => Some(Region::Instructions),
            _ => None,
        }
    }

    /// First address of this region, used by the memory-dump offset column.
    pub fn base(self) -> u32 {
        match self {
            Region::Storage => STORAGE_START,
            Region::Stack => STACK_START,
            Region::Display => DISPLAY_START,
            Region::Instructions => INSTRUCTIONS_START,
        }
    }

    /// Last address (inclusive) of this region.
    pub fn end(self) -> u32 {
        match self {
            Region::Storage => STORAGE_END,
            Region::Stack => STACK_END,
            Region::Display => DISPLAY_END,
            Region::Instructions => INSTRUCTIONS_END,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::Storage => "STORAGE",
            Region::Stack => "STACK",
            Region::Display => "DISPLAY",
            Region::Instructions => "INSTRUCTIONS",
        }
    }
}

/// Bounded random-access storage of cells. No semantics beyond bounds
/// checking: the machine and the assembler are the only things that know
/// what a cell's fields mean.
///
/// # Examples
///
/// ```
/// use tasm::{Tape, Cell, DType};
///
/// let mut tape = Tape::new();
/// tape.write(10, Cell::data(42, DType::Numeric)).unwrap();
/// assert_eq!(tape.read(10).unwrap().data, 42);
/// assert!(tape.read(1_000_000).is_err());
/// ```
pub struct Tape {
    cells: Vec<Cell>,
}

impl Tape {
    pub fn new() -> Tape {
        Tape {
            cells: vec![Cell::default(); TAPE_LEN],
        }
    }

    pub fn region_of(&self, addr: u32) -> Result<Region, RuntimeError> {
        Region::of(addr).ok_or(RuntimeError::OutOfBounds { addr })
    }

    pub fn read(&self, addr: u32) -> Result<Cell, RuntimeError> {
        self.region_of(addr)?;
        Ok(self.cells[addr as usize])
    }

    pub fn write(&mut self, addr: u32, cell: Cell) -> Result<(), RuntimeError> {
        self.region_of(addr)?;
        self.cells[addr as usize] = cell;
        Ok(())
    }

    /// Iterate every cell of one region in ascending address order, paired
    /// with its absolute address — used by the memory-dump writer.
    pub fn iter_region(&self, region: Region) -> impl Iterator<Item = (u32, Cell)> + '_ {
        (region.base()..=region.end()).map(move |addr| (addr, self.cells[addr as usize]))
    }
}

impl Default for Tape {
    fn default() -> Tape {
        Tape::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::DType;

    #[test]
    fn region_of_classifies_every_boundary() {
        assert_eq!(Region::of(0), Some(Region::Storage));
        assert_eq!(Region::of(99_999), Some(Region::Storage));
        assert_eq!(Region::of(100_000), Some(Region::Stack));
        assert_eq!(Region::of(100_999), Some(Region::Stack));
        assert_eq!(Region::of(101_000), Some(Region::Display));
        assert_eq!(Region::of(200_999), Some(Region::Display));
        assert_eq!(Region::of(201_000), Some(Region::Instructions));
        assert_eq!(Region::of(300_999), Some(Region::Instructions));
        assert_eq!(Region::of(301_000), None);
    }

    #[test]
    fn read_write_round_trips() {
        let mut tape = Tape::new();
        tape.write(55, Cell::data(9, DType::Character)).unwrap();
        let c = tape.read(55).unwrap();
        assert_eq!(c.data, 9);
        assert_eq!(c.dtype, DType::Character);
    }

    #[test]
    fn out_of_bounds_fails_on_read_and_write() {
        let mut tape = Tape::new();
        assert!(matches!(
            tape.read(300_999 + 1),
            Err(RuntimeError::OutOfBounds { .. })
        ));
        assert!(matches!(
            tape.write(300_999 + 1, Cell::default()),
            Err(RuntimeError::OutOfBounds { .. })
        ));
    }
}
