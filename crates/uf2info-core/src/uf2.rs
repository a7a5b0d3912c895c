use assert_into::AssertInto;
use static_assertions::const_assert;
use std::mem;
use thiserror::Error;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

pub const UF2_MAGIC_START0: u32 = 0x0A324655;
pub const UF2_MAGIC_START1: u32 = 0x9E5D5157;
pub const UF2_MAGIC_END: u32 = 0x0AB16F30;

pub const UF2_FLAG_NOT_MAIN_FLASH: u32 = 0x00000001;
pub const UF2_FLAG_FILE_CONTAINER: u32 = 0x00001000;
pub const UF2_FLAG_FAMILY_ID_PRESENT: u32 = 0x00002000;
pub const UF2_FLAG_MD5_PRESENT: u32 = 0x00004000;
pub const UF2_FLAG_EXTENSION_TAGS_PRESENT: u32 = 0x00008000;

pub const UF2_BLOCK_SIZE: usize = 512;
pub const UF2_PAYLOAD_CAPACITY: usize = 476;

pub type Uf2BlockData = [u8; UF2_PAYLOAD_CAPACITY];

/// One 512 byte UF2 record. All header and footer fields are little-endian
/// on the wire; [`Uf2Block::decode`] normalises them to host order.
#[repr(C)]
#[derive(Clone, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct Uf2Block {
    // 32 byte header
    pub magic_start0: u32,
    pub magic_start1: u32,
    pub flags: u32,
    pub target_addr: u32,
    pub payload_size: u32,
    pub block_no: u32,
    pub num_blocks: u32,
    pub file_size: u32, // or familyID
    pub data: Uf2BlockData,
    pub magic_end: u32,
}

const_assert!(mem::size_of::<Uf2Block>() == UF2_BLOCK_SIZE);

/// The `file_size` field carries a family id instead of a size whenever
/// [`UF2_FLAG_FAMILY_ID_PRESENT`] is set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FileSizeField {
    FamilyId(u32),
    FileSize(u32),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected a {UF2_BLOCK_SIZE} byte block, got {0} bytes")]
    WrongSize(usize),
}

impl Uf2Block {
    /// Reinterprets exactly 512 bytes as a block. Only the length is checked
    /// here, content validation happens in [`crate::validate`].
    pub fn decode(buf: &[u8]) -> Result<Uf2Block, DecodeError> {
        let mut block =
            Uf2Block::read_from_bytes(buf).map_err(|_| DecodeError::WrongSize(buf.len()))?;

        block.magic_start0 = u32::from_le(block.magic_start0);
        block.magic_start1 = u32::from_le(block.magic_start1);
        block.flags = u32::from_le(block.flags);
        block.target_addr = u32::from_le(block.target_addr);
        block.payload_size = u32::from_le(block.payload_size);
        block.block_no = u32::from_le(block.block_no);
        block.num_blocks = u32::from_le(block.num_blocks);
        block.file_size = u32::from_le(block.file_size);
        block.magic_end = u32::from_le(block.magic_end);

        Ok(block)
    }

    pub fn file_size_field(&self) -> FileSizeField {
        if self.flags & UF2_FLAG_FAMILY_ID_PRESENT != 0 {
            FileSizeField::FamilyId(self.file_size)
        } else {
            FileSizeField::FileSize(self.file_size)
        }
    }

    /// The valid payload bytes, clamped to the data buffer so a corrupt
    /// `payload_size` cannot read past it.
    pub fn payload(&self) -> &[u8] {
        let len = usize::min(self.payload_size.assert_into(), UF2_PAYLOAD_CAPACITY);
        &self.data[..len]
    }
}
