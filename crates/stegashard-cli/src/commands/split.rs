use std::path::PathBuf;

use clap::Args;

use crate::CliResult;

/// Splits a file into numbered fragments and stores its SHA-256 digest next to them
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// File to split
    #[arg(short = 'i', long = "in", value_name = "source file")]
    pub source: PathBuf,

    /// Fragments and digest will be stored in that folder
    #[arg(short = 'o', long = "out", value_name = "output folder", default_value = "fragments")]
    pub output_folder: PathBuf,

    /// Number of fragments, at least 3
    #[arg(short = 'n', long, value_name = "count", default_value_t = stegashard_core::api::split::DEFAULT_FRAGMENTS)]
    pub fragments: usize,
}

impl SplitArgs {
    pub fn run(self) -> CliResult<()> {
        let report = stegashard_core::api::split::prepare()
            .with_source(&self.source)
            .into_output_folder(&self.output_folder)
            .with_fragments(self.fragments)
            .execute()?;

        for (file, size) in report.files.iter().zip(&report.chunk_sizes) {
            println!("{} ({size} bytes)", file.display());
        }
        println!("sha256 {}", report.digest);
        Ok(())
    }
}
