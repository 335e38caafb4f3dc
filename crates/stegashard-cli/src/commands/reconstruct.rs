use std::path::PathBuf;

use clap::Args;
use stegashard_core::api::reconstruct::DEFAULT_OUTPUT_NAME;
use stegashard_core::{Channels, ProcessExecutor};

use crate::CliResult;

/// Finds fragments below a folder, reassembles and verifies the file
#[derive(Args, Debug)]
pub struct ReconstructArgs {
    /// Folder that is searched recursively for stego images
    #[arg(short, long, value_name = "root folder")]
    pub root: PathBuf,

    /// Reconstructed file will be stored in that folder
    #[arg(short = 'o', long = "out", value_name = "output folder", default_value = "reconstruction")]
    pub output_folder: PathBuf,

    /// File name of the reconstructed file
    #[arg(long, value_name = "file name", default_value = DEFAULT_OUTPUT_NAME)]
    pub name: String,

    /// Digest file to verify against, defaults to `sha256_original.txt` in the output folder
    #[arg(long, value_name = "digest file")]
    pub digest: Option<PathBuf>,

    /// Only try this many color channels instead of detecting them
    #[arg(short, long, value_name = "1-3", value_parser = clap::value_parser!(u8).range(1..=3))]
    pub channels: Option<u8>,

    /// Runs the reconstructed file and exits with its exit code
    #[arg(short = 'x', long)]
    pub execute: bool,

    /// Interpreter used to run the reconstructed file, e.g. `python3`
    #[arg(long, value_name = "program", requires = "execute")]
    pub interpreter: Option<String>,

    /// Argument passed to the reconstructed file
    #[arg(long, value_name = "argument", requires = "execute")]
    pub arg: Option<String>,
}

impl ReconstructArgs {
    /// returns the exit code of the reconstructed program, or 0 if it was not run
    pub fn run(self) -> CliResult<i32> {
        let mut api = stegashard_core::api::reconstruct::prepare()
            .from_root(&self.root)
            .into_output_folder(&self.output_folder)
            .with_output_name(self.name.as_str());
        if let Some(digest) = &self.digest {
            api = api.verify_against(digest);
        }
        if let Some(channels) = self.channels {
            api = api.with_channels(Channels::new(channels)?);
        }

        let report = api.execute()?;
        println!(
            "{} ({} of {} fragments from {} images)",
            report.output_file.display(),
            report.fragments.len(),
            report.total.unwrap_or_default(),
            report.images_seen
        );
        println!("sha256 {} {}", report.digest, report.check);

        if !self.execute {
            return Ok(0);
        }
        let executor = ProcessExecutor {
            interpreter: self.interpreter,
        };
        report.hand_off(&executor, self.arg.as_deref())
    }
}
