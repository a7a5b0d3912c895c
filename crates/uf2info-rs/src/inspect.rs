use assert_into::AssertInto;
use log::info;
use std::{
    fs::{self, File},
    io::BufReader,
};
use thiserror::Error;
use uf2info_core::{
    families::family_name, scan_blocks, uf2::Uf2Block, Uf2InfoError, Uf2Report, UF2_BLOCK_SIZE,
};

#[derive(Error, Debug)]
pub enum InspectError {
    #[error("can not get file information for {path}: {source}")]
    Stat {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid file size of {0} bytes")]
    InvalidFileSize(u64),
    #[error("can not open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Scan(#[from] Uf2InfoError),
}

impl InspectError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            InspectError::Stat { .. } => 2,
            InspectError::InvalidFileSize(_) => 3,
            InspectError::Open { .. } => 4,
            InspectError::Scan(err) => match err {
                Uf2InfoError::BlockCountMismatch { .. } => 5,
                Uf2InfoError::BlockIndexMismatch { .. } => 6,
                Uf2InfoError::InvalidMagic { .. } | Uf2InfoError::FailedToDecode(_) => 7,
                Uf2InfoError::TruncatedFile { .. }
                | Uf2InfoError::FailedToRead(_)
                | Uf2InfoError::FailedToWrite(_) => 4,
            },
        }
    }
}

/// Stats, opens and validates a UF2 file, optionally dumping or extracting
/// each block's payload along the way.
pub fn inspect(path: &str, dump: bool, write_bins: bool) -> Result<(), InspectError> {
    let file_size = fs::metadata(path)
        .map_err(|source| InspectError::Stat {
            path: path.to_string(),
            source,
        })?
        .len();
    info!("file size {file_size} bytes");

    if file_size % UF2_BLOCK_SIZE as u64 != 0 {
        return Err(InspectError::InvalidFileSize(file_size));
    }
    let num_blocks: u32 = (file_size / UF2_BLOCK_SIZE as u64).assert_into();
    info!("file has {num_blocks} blocks");

    let input = BufReader::new(File::open(path).map_err(|source| InspectError::Open {
        path: path.to_string(),
        source,
    })?);

    let report = scan_blocks(input, num_blocks, |index, block| {
        if dump {
            dump_payload(block);
        }
        if write_bins {
            fs::write(format!("{index}.bin"), block.payload())
                .map_err(Uf2InfoError::FailedToWrite)?;
        }
        Ok(())
    })?;

    summarize(&report);

    Ok(())
}

fn dump_payload(block: &Uf2Block) {
    for (line_no, line) in block.payload().chunks(16).enumerate() {
        let addr = u64::from(block.target_addr) + (line_no * 16) as u64;
        let bytes = line
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{addr:#010x}: {bytes}");
    }
}

fn summarize(report: &Uf2Report) {
    match report.family_id {
        Some(id) => match family_name(id) {
            Some(name) => info!("family {name}"),
            None => info!("family {id:#010x} (unknown)"),
        },
        None => info!("no family id present"),
    }

    info!(
        "{} blocks ok, {} memory ranges",
        report.num_blocks,
        report.ranges.len()
    );
}
