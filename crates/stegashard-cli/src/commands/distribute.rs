use std::path::PathBuf;

use clap::Args;
use stegashard_core::PlacementMode;

use crate::CliResult;

/// Scatters stego images over destination folders
#[derive(Args, Debug)]
pub struct DistributeArgs {
    /// Folder with the stego images
    #[arg(short, long, value_name = "stego folder", default_value = "stego")]
    pub stego: PathBuf,

    /// All destinations are relative to this folder
    #[arg(short, long, value_name = "destination root")]
    pub root: PathBuf,

    /// Destination as `name=relative/path`, can be repeated. Without any a default layout is used
    #[arg(short = 'd', long = "destination", value_name = "name=path")]
    pub destinations: Vec<String>,

    /// Placement mode: random, round-robin or mapping
    #[arg(short, long, value_name = "mode", default_value = "random", value_parser = parse_mode)]
    pub mode: PlacementMode,

    /// CSV file with `filename,destination` lines, required for mapping mode
    #[arg(long, value_name = "mapping file", required_if_eq("mode", "mapping"))]
    pub mapping: Option<PathBuf>,

    /// Seed for reproducible random placement
    #[arg(long, value_name = "seed")]
    pub seed: Option<u64>,

    /// Only print where the images would go
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_mode(s: &str) -> Result<PlacementMode, String> {
    s.parse().map_err(|e: stegashard_core::ShardError| e.to_string())
}

impl DistributeArgs {
    pub fn run(self) -> CliResult<()> {
        let mut api = stegashard_core::api::distribute::prepare()
            .from_stego_folder(&self.stego)
            .into_destination_root(&self.root)
            .with_mode(self.mode)
            .dry_run(self.dry_run);
        for destination in self.destinations {
            api = api.with_destination(destination);
        }
        if let Some(mapping) = &self.mapping {
            api = api.use_mapping_file(mapping);
        }
        if let Some(seed) = self.seed {
            api = api.with_seed(seed);
        }

        let plan = api.execute()?;
        let prefix = if self.dry_run { "[dry-run] " } else { "" };
        for copy in &plan.copies {
            println!("{prefix}{copy}");
        }
        for skipped in &plan.skipped {
            println!("skipped {}", skipped.display());
        }
        Ok(())
    }
}
