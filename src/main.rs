//! JPEG 2000 pixel data transcoder CLI
//!
//! Encodes raw raster files into per-slice JPEG 2000 fragments and decodes
//! fragment item streams or DICOM files back into raster files.

use clap::Parser;
use medimg_j2k::cli::{run, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
