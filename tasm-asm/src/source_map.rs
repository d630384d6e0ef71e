/// The source line (1-based) that produced one emitted cell.
#[derive(Clone, Copy, Debug)]
pub struct SourceMapItem {
    pub addr: u32,
    pub line: usize,
}

/// Maps emitted instruction-region cells back to the source line that
/// produced them, in emission order. Used to cite the correct line number
/// for `InstructionOverflow` and any diagnostic that needs to walk back from
/// an address to a line.
#[derive(Default)]
pub struct SourceMap {
    items: Vec<SourceMapItem>,
}

impl SourceMap {
    pub fn new() -> SourceMap {
        SourceMap { items: Vec::new() }
    }

    pub fn record(&mut self, addr: u32, line: usize) {
        self.items.push(SourceMapItem { addr, line });
    }

    pub fn line_for(&self, addr: u32) -> Option<usize> {
        self.items
            .iter()
            .rev()
            .find(|item| item.addr <= addr)
            .map(|item| item.line)
    }
}
