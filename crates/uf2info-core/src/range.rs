use std::fmt;

/// A half-open span of target memory, coalesced from contiguous blocks.
///
/// Bounds are u64 so a payload ending at the top of the 32 bit address space
/// still has a representable end.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MemoryRange {
    pub from: u64,
    pub to: u64,
}

impl MemoryRange {
    pub const fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> u64 {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.to == self.from
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#010x}..{:#010x} ({} bytes)",
            self.from,
            self.to,
            self.len()
        )
    }
}

/// Folds per-block target addresses into contiguous spans, so a few hundred
/// 256 byte blocks report as a handful of memory regions.
#[derive(Debug, Default)]
pub struct RangeCoalescer {
    open: Option<MemoryRange>,
}

impl RangeCoalescer {
    /// Feeds one block's destination. Returns the previous span when the new
    /// block does not extend it exactly.
    pub fn observe(&mut self, target_addr: u32, size: u32) -> Option<MemoryRange> {
        let from = u64::from(target_addr);
        let to = from + u64::from(size);

        match &mut self.open {
            Some(range) if range.to == from => {
                range.to = to;
                None
            }
            Some(range) => {
                let closed = *range;
                *range = MemoryRange::new(from, to);
                Some(closed)
            }
            None => {
                self.open = Some(MemoryRange::new(from, to));
                None
            }
        }
    }

    /// Flushes the still-open span. Must be called after the last block or
    /// the final span is dropped.
    pub fn finish(&mut self) -> Option<MemoryRange> {
        self.open.take()
    }
}
