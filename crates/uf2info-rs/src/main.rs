use clap::Parser;
use env_logger::Env;
use log::{error, Level, LevelFilter};
use std::{io::Write, process};

use crate::inspect::inspect;

mod inspect;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Validate and inspect UF2 firmware update images", long_about = None)]
struct Opts {
    /// Hex dump each block's payload with its target memory address
    #[clap(short, long)]
    dump: bool,

    /// Write each block's payload to <blockIndex>.bin in the working directory
    #[clap(short, long)]
    bin: bool,

    /// Verbose
    #[clap(short, long)]
    verbose: bool,

    /// Input UF2 file
    input: Option<String>,
}

fn main() {
    let options = Opts::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(match options.verbose {
            true => LevelFilter::Debug,
            false => LevelFilter::Info,
        })
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let level = record.level();
            if level == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
        })
        .init();

    let Some(input) = options.input else {
        error!("usage: uf2info-rs [-d|-b] <file.uf2>");
        process::exit(1);
    };

    if let Err(err) = inspect(&input, options.dump, options.bin) {
        error!("{err}");
        process::exit(err.exit_code());
    }
}
