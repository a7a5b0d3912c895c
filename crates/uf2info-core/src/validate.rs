use crate::{
    families::family_name,
    range::{MemoryRange, RangeCoalescer},
    uf2::{
        FileSizeField, Uf2Block, UF2_FLAG_EXTENSION_TAGS_PRESENT, UF2_FLAG_FILE_CONTAINER,
        UF2_FLAG_MD5_PRESENT, UF2_FLAG_NOT_MAIN_FLASH, UF2_MAGIC_END, UF2_MAGIC_START0,
        UF2_MAGIC_START1,
    },
    Uf2InfoError,
};
use std::fmt;

/// Advisory finding for one block. Notes never abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    NotMainFlash { block: u32 },
    FileContainer { block: u32 },
    FamilyIdMissing { block: u32 },
    Md5Present { block: u32 },
    ExtensionTagsPresent { block: u32 },
    FamilyIdentified { block: u32, id: u32 },
    FamilyIdChanged { block: u32, from: u32, to: u32 },
    PayloadSize { block: u32, size: u32 },
    PayloadSizeChanged { block: u32, from: u32, to: u32 },
    NonZeroPadding { block: u32, offset: usize },
}

impl Note {
    /// Anomalies are logged at warn level, the rest is plain information.
    pub fn is_anomaly(&self) -> bool {
        matches!(
            self,
            Note::FamilyIdMissing { .. }
                | Note::FamilyIdChanged { .. }
                | Note::PayloadSizeChanged { .. }
                | Note::NonZeroPadding { .. }
        )
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Note::NotMainFlash { block } => {
                write!(f, "block {block}: not-main-flash flag set")
            }
            Note::FileContainer { block } => {
                write!(f, "block {block}: file-container flag set")
            }
            Note::FamilyIdMissing { block } => {
                write!(f, "block {block}: family id flag missing")
            }
            Note::Md5Present { block } => {
                write!(f, "block {block}: MD5 checksum flag set")
            }
            Note::ExtensionTagsPresent { block } => {
                write!(f, "block {block}: extension tags flag set")
            }
            Note::FamilyIdentified { block, id } => match family_name(id) {
                Some(name) => write!(f, "block {block}: family id {id:#010x} ({name})"),
                None => write!(f, "block {block}: unknown family id {id:#010x}"),
            },
            Note::FamilyIdChanged { block, from, to } => {
                write!(
                    f,
                    "block {block}: family id changed from {from:#010x} to {to:#010x} ({})",
                    family_name(to).unwrap_or("unknown")
                )
            }
            Note::PayloadSize { block, size } => {
                write!(f, "block {block}: payload size {size} bytes")
            }
            Note::PayloadSizeChanged { block, from, to } => {
                write!(f, "block {block}: payload size changed from {from} to {to}")
            }
            Note::NonZeroPadding { block, offset } => {
                write!(f, "block {block}: non-zero padding byte at data offset {offset}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct FamilyTracker {
    established: Option<u32>,
}

impl FamilyTracker {
    /// The first id establishes the family. A differing id reports the change
    /// and re-establishes, so each transition is reported once.
    pub fn observe(&mut self, block: u32, id: u32) -> Option<Note> {
        match self.established.replace(id) {
            None => Some(Note::FamilyIdentified { block, id }),
            Some(previous) if previous != id => Some(Note::FamilyIdChanged {
                block,
                from: previous,
                to: id,
            }),
            Some(_) => None,
        }
    }

    pub fn family_id(&self) -> Option<u32> {
        self.established
    }
}

#[derive(Debug, Default)]
pub struct PayloadSizeTracker {
    established: Option<u32>,
}

impl PayloadSizeTracker {
    pub fn observe(&mut self, block: u32, size: u32) -> Option<Note> {
        match self.established.replace(size) {
            None => Some(Note::PayloadSize { block, size }),
            Some(previous) if previous != size => Some(Note::PayloadSizeChanged {
                block,
                from: previous,
                to: size,
            }),
            Some(_) => None,
        }
    }

    pub fn payload_size(&self) -> Option<u32> {
        self.established
    }
}

/// Cross-block state for one validation run. Created empty before the first
/// block, threaded through [`validate_block`] by the driver and finalized
/// once the last block has been read. Never shared, never global.
#[derive(Debug, Default)]
pub struct ValidationState {
    family: FamilyTracker,
    payload: PayloadSizeTracker,
    ranges: RangeCoalescer,
}

impl ValidationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family_id(&self) -> Option<u32> {
        self.family.family_id()
    }

    pub fn payload_size(&self) -> Option<u32> {
        self.payload.payload_size()
    }

    /// Flushes the still-open memory range after the last block.
    pub fn finish(&mut self) -> Option<MemoryRange> {
        self.ranges.finish()
    }
}

/// Everything one block contributed short of a fatal error.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub notes: Vec<Note>,
    /// Span closed because this block's target address was not contiguous
    /// with it.
    pub closed_range: Option<MemoryRange>,
}

/// Checks one decoded block against the format's structural invariants and
/// feeds the cross-block trackers.
///
/// Magic, block count and block index failures are fatal and abort the run;
/// every later check is advisory and all of them are evaluated.
pub fn validate_block(
    block: &Uf2Block,
    expected_index: u32,
    expected_total: u32,
    state: &mut ValidationState,
) -> Result<BlockOutcome, Uf2InfoError> {
    if block.magic_start0 != UF2_MAGIC_START0
        || block.magic_start1 != UF2_MAGIC_START1
        || block.magic_end != UF2_MAGIC_END
    {
        return Err(Uf2InfoError::InvalidMagic {
            block: expected_index,
        });
    }

    if block.num_blocks != expected_total {
        return Err(Uf2InfoError::BlockCountMismatch {
            block: expected_index,
            found: block.num_blocks,
            expected: expected_total,
        });
    }

    if block.block_no != expected_index {
        return Err(Uf2InfoError::BlockIndexMismatch {
            found: block.block_no,
            expected: expected_index,
        });
    }

    let mut notes = Vec::new();

    if block.flags & UF2_FLAG_NOT_MAIN_FLASH != 0 {
        notes.push(Note::NotMainFlash {
            block: expected_index,
        });
    }

    if block.flags & UF2_FLAG_FILE_CONTAINER != 0 {
        notes.push(Note::FileContainer {
            block: expected_index,
        });
    }

    match block.file_size_field() {
        FileSizeField::FamilyId(id) => notes.extend(state.family.observe(expected_index, id)),
        // The family id flag is recommended but not required by the format.
        FileSizeField::FileSize(_) => notes.push(Note::FamilyIdMissing {
            block: expected_index,
        }),
    }

    if block.flags & UF2_FLAG_MD5_PRESENT != 0 {
        notes.push(Note::Md5Present {
            block: expected_index,
        });
    }

    if block.flags & UF2_FLAG_EXTENSION_TAGS_PRESENT != 0 {
        notes.push(Note::ExtensionTagsPresent {
            block: expected_index,
        });
    }

    notes.extend(state.payload.observe(expected_index, block.payload_size));

    for (offset, byte) in block.data.iter().enumerate().skip(block.payload().len()) {
        if *byte != 0 {
            notes.push(Note::NonZeroPadding {
                block: expected_index,
                offset,
            });
        }
    }

    let closed_range = state.ranges.observe(block.target_addr, block.payload_size);

    Ok(BlockOutcome {
        notes,
        closed_range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uf2::{Uf2BlockData, UF2_FLAG_FAMILY_ID_PRESENT, UF2_PAYLOAD_CAPACITY};

    const RP2040: u32 = 0xe48bff56;

    fn block(block_no: u32, num_blocks: u32, target_addr: u32) -> Uf2Block {
        let mut data: Uf2BlockData = [0; UF2_PAYLOAD_CAPACITY];
        data[..256].fill(0xab);

        Uf2Block {
            magic_start0: UF2_MAGIC_START0,
            magic_start1: UF2_MAGIC_START1,
            flags: UF2_FLAG_FAMILY_ID_PRESENT,
            target_addr,
            payload_size: 256,
            block_no,
            num_blocks,
            file_size: RP2040,
            data,
            magic_end: UF2_MAGIC_END,
        }
    }

    #[test]
    fn first_block_identifies_family_and_payload_size() {
        let mut state = ValidationState::new();
        let outcome = validate_block(&block(0, 2, 0x1000), 0, 2, &mut state).unwrap();

        assert_eq!(
            outcome.notes,
            vec![
                Note::FamilyIdentified {
                    block: 0,
                    id: RP2040
                },
                Note::PayloadSize {
                    block: 0,
                    size: 256
                },
            ]
        );
        assert_eq!(outcome.closed_range, None);
        assert_eq!(state.family_id(), Some(RP2040));
        assert_eq!(state.payload_size(), Some(256));
    }

    #[test]
    fn steady_state_block_is_silent() {
        let mut state = ValidationState::new();
        validate_block(&block(0, 2, 0x1000), 0, 2, &mut state).unwrap();
        let outcome = validate_block(&block(1, 2, 0x1100), 1, 2, &mut state).unwrap();

        assert!(outcome.notes.is_empty());
        assert_eq!(outcome.closed_range, None);
    }

    #[test]
    fn any_bad_magic_is_fatal() {
        let corruptions: [fn(&mut Uf2Block); 3] = [
            |b| b.magic_start0 = 0,
            |b| b.magic_start1 = 0,
            |b| b.magic_end = 0,
        ];

        for corrupt in corruptions {
            let mut state = ValidationState::new();
            let mut bad = block(0, 1, 0x1000);
            corrupt(&mut bad);

            assert!(matches!(
                validate_block(&bad, 0, 1, &mut state),
                Err(Uf2InfoError::InvalidMagic { block: 0 })
            ));
        }
    }

    #[test]
    fn block_count_mismatch_is_fatal() {
        let mut state = ValidationState::new();
        let result = validate_block(&block(0, 5, 0x1000), 0, 4, &mut state);

        assert!(matches!(
            result,
            Err(Uf2InfoError::BlockCountMismatch {
                block: 0,
                found: 5,
                expected: 4
            })
        ));
    }

    #[test]
    fn block_index_mismatch_is_fatal() {
        let mut state = ValidationState::new();
        let result = validate_block(&block(2, 4, 0x1000), 1, 4, &mut state);

        assert!(matches!(
            result,
            Err(Uf2InfoError::BlockIndexMismatch {
                found: 2,
                expected: 1
            })
        ));
    }

    #[test]
    fn informational_flags_are_noted() {
        let mut state = ValidationState::new();
        let mut flagged = block(0, 1, 0x1000);
        flagged.flags |= UF2_FLAG_NOT_MAIN_FLASH
            | UF2_FLAG_FILE_CONTAINER
            | UF2_FLAG_MD5_PRESENT
            | UF2_FLAG_EXTENSION_TAGS_PRESENT;

        let outcome = validate_block(&flagged, 0, 1, &mut state).unwrap();

        assert!(outcome.notes.contains(&Note::NotMainFlash { block: 0 }));
        assert!(outcome.notes.contains(&Note::FileContainer { block: 0 }));
        assert!(outcome.notes.contains(&Note::Md5Present { block: 0 }));
        assert!(outcome
            .notes
            .contains(&Note::ExtensionTagsPresent { block: 0 }));
    }

    #[test]
    fn missing_family_flag_is_advisory() {
        let mut state = ValidationState::new();
        let mut plain = block(0, 1, 0x1000);
        plain.flags = 0;
        plain.file_size = 123456;

        let outcome = validate_block(&plain, 0, 1, &mut state).unwrap();

        assert!(outcome.notes.contains(&Note::FamilyIdMissing { block: 0 }));
        assert_eq!(state.family_id(), None);
    }

    #[test]
    fn family_change_is_advisory_not_fatal() {
        let mut state = ValidationState::new();
        validate_block(&block(0, 2, 0x1000), 0, 2, &mut state).unwrap();

        let mut other = block(1, 2, 0x1100);
        other.file_size = 0xada52840;
        let outcome = validate_block(&other, 1, 2, &mut state).unwrap();

        assert!(outcome.notes.contains(&Note::FamilyIdChanged {
            block: 1,
            from: RP2040,
            to: 0xada52840
        }));
        assert_eq!(state.family_id(), Some(0xada52840));
    }

    #[test]
    fn payload_size_change_is_advisory() {
        let mut state = ValidationState::new();
        validate_block(&block(0, 2, 0x1000), 0, 2, &mut state).unwrap();

        let mut shorter = block(1, 2, 0x1100);
        shorter.payload_size = 128;
        shorter.data[128..256].fill(0);
        let outcome = validate_block(&shorter, 1, 2, &mut state).unwrap();

        assert!(outcome.notes.contains(&Note::PayloadSizeChanged {
            block: 1,
            from: 256,
            to: 128
        }));
    }

    #[test]
    fn one_note_per_nonzero_padding_byte() {
        let mut state = ValidationState::new();
        let mut padded = block(0, 1, 0x1000);
        padded.data[300] = 0x01;
        padded.data[475] = 0xff;

        let outcome = validate_block(&padded, 0, 1, &mut state).unwrap();
        let padding: Vec<_> = outcome
            .notes
            .iter()
            .filter(|note| matches!(note, Note::NonZeroPadding { .. }))
            .collect();

        assert_eq!(
            padding,
            vec![
                &Note::NonZeroPadding {
                    block: 0,
                    offset: 300
                },
                &Note::NonZeroPadding {
                    block: 0,
                    offset: 475
                },
            ]
        );
    }

    #[test]
    fn oversize_payload_has_no_padding_region() {
        let mut state = ValidationState::new();
        let mut oversize = block(0, 1, 0x1000);
        oversize.payload_size = 0xffffffff;
        oversize.data.fill(0xee);

        let outcome = validate_block(&oversize, 0, 1, &mut state).unwrap();

        assert!(!outcome
            .notes
            .iter()
            .any(|note| matches!(note, Note::NonZeroPadding { .. })));
    }

    #[test]
    fn non_contiguous_block_closes_the_range() {
        let mut state = ValidationState::new();
        validate_block(&block(0, 2, 0x1000), 0, 2, &mut state).unwrap();

        let outcome = validate_block(&block(1, 2, 0x2000), 1, 2, &mut state).unwrap();

        assert_eq!(outcome.closed_range, Some(MemoryRange::new(0x1000, 0x1100)));
        assert_eq!(state.finish(), Some(MemoryRange::new(0x2000, 0x2100)));
    }

    #[test]
    fn note_display_resolves_family_names() {
        let known = Note::FamilyIdentified {
            block: 0,
            id: RP2040,
        };
        assert_eq!(
            known.to_string(),
            "block 0: family id 0xe48bff56 (Raspberry Pi RP2040)"
        );

        let unknown = Note::FamilyIdentified {
            block: 3,
            id: 0xdeadbeef,
        };
        assert_eq!(unknown.to_string(), "block 3: unknown family id 0xdeadbeef");
    }
}
