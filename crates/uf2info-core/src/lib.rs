//! Streaming validator for UF2 firmware update images.
//!
//! A UF2 file is a sequence of fixed 512 byte blocks. [`scan`] reads them
//! one at a time from any [`Read`] source, checks the structural invariants
//! of each block, tracks cross-block consistency (family id, payload size,
//! contiguous target memory) and returns a [`Uf2Report`]. Only one block
//! buffer is live at a time, so memory use does not depend on file size.

use crate::validate::validate_block;
use log::{debug, info, warn};
use std::io::Read;
use thiserror::Error;

pub mod families;
pub mod range;
pub mod uf2;
pub mod validate;

pub use families::family_name;
pub use range::MemoryRange;
pub use uf2::{DecodeError, Uf2Block, UF2_BLOCK_SIZE};
pub use validate::{Note, ValidationState};

/// Fatal conditions. Any of these aborts the run; everything else the
/// validator finds is an advisory [`Note`].
#[derive(Error, Debug)]
pub enum Uf2InfoError {
    #[error("block {block} is not a valid UF2 block (bad magic)")]
    InvalidMagic { block: u32 },
    #[error("block {block} claims {found} total blocks, the file has {expected}")]
    BlockCountMismatch { block: u32, found: u32, expected: u32 },
    #[error("read block {found} where block {expected} was expected")]
    BlockIndexMismatch { found: u32, expected: u32 },
    #[error("file truncated in block {block}")]
    TruncatedFile { block: u32 },
    #[error("failed to decode block")]
    FailedToDecode(#[from] DecodeError),
    #[error("failed to read from input: {0}")]
    FailedToRead(std::io::Error),
    #[error("failed to write block payload: {0}")]
    FailedToWrite(std::io::Error),
}

/// Summary of one completed validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uf2Report {
    pub num_blocks: u32,
    /// Established family id, if any block carried the family id flag.
    pub family_id: Option<u32>,
    /// Established payload size.
    pub payload_size: Option<u32>,
    /// Coalesced target memory spans, in file order.
    pub ranges: Vec<MemoryRange>,
    /// Advisory findings, in block order.
    pub notes: Vec<Note>,
}

fn read_block(
    input: &mut impl Read,
    buf: &mut [u8; UF2_BLOCK_SIZE],
    block: u32,
) -> Result<(), Uf2InfoError> {
    input.read_exact(buf).map_err(|err| {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Uf2InfoError::TruncatedFile { block }
        } else {
            Uf2InfoError::FailedToRead(err)
        }
    })
}

/// Validates a stream of `num_blocks` UF2 blocks, invoking `on_block` for
/// every block that passed validation.
///
/// The hook is how callers consume payloads (hex dumps, per-block extraction)
/// without the driver ever buffering more than one block.
pub fn scan_blocks(
    mut input: impl Read,
    num_blocks: u32,
    mut on_block: impl FnMut(u32, &Uf2Block) -> Result<(), Uf2InfoError>,
) -> Result<Uf2Report, Uf2InfoError> {
    let mut state = ValidationState::new();
    let mut notes = Vec::new();
    let mut ranges = Vec::new();
    let mut buf = [0; UF2_BLOCK_SIZE];

    for index in 0..num_blocks {
        read_block(&mut input, &mut buf, index)?;
        let block = Uf2Block::decode(&buf)?;

        debug!("Block {} / {} {:#010x}", index, num_blocks, block.target_addr);

        let outcome = validate_block(&block, index, num_blocks, &mut state)?;

        for note in &outcome.notes {
            if note.is_anomaly() {
                warn!("{note}");
            } else {
                info!("{note}");
            }
        }

        if let Some(range) = outcome.closed_range {
            info!("memory range {range}");
            ranges.push(range);
        }

        on_block(index, &block)?;
        notes.extend(outcome.notes);
    }

    if let Some(range) = state.finish() {
        info!("memory range {range}");
        ranges.push(range);
    }

    Ok(Uf2Report {
        num_blocks,
        family_id: state.family_id(),
        payload_size: state.payload_size(),
        ranges,
        notes,
    })
}

/// Validates a whole UF2 stream of `num_blocks` blocks.
pub fn scan(input: impl Read, num_blocks: u32) -> Result<Uf2Report, Uf2InfoError> {
    scan_blocks(input, num_blocks, |_, _| Ok(()))
}
