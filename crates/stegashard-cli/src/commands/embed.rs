use std::path::PathBuf;

use clap::Args;
use stegashard_core::Channels;

use crate::CliResult;

/// Hides every fragment in its own carrier image
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Folder with the `part_*.bin` fragments
    #[arg(short, long, value_name = "fragments folder", default_value = "fragments")]
    pub fragments: PathBuf,

    /// Folder with PNG or JPEG carrier images, used readonly.
    #[arg(short, long, value_name = "images folder", default_value = "images")]
    pub images: PathBuf,

    /// Stego images will be stored as PNG in that folder
    #[arg(short = 'o', long = "out", value_name = "output folder", default_value = "stego")]
    pub output_folder: PathBuf,

    /// Color channels per pixel that carry a bit, in R, G, B order
    #[arg(short, long, value_name = "1-3", default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=3))]
    pub channels: u8,
}

impl EmbedArgs {
    pub fn run(self) -> CliResult<()> {
        let written = stegashard_core::api::embed::prepare()
            .from_fragments_folder(&self.fragments)
            .with_images_folder(&self.images)
            .into_output_folder(&self.output_folder)
            .with_channels(Channels::new(self.channels)?)
            .execute()?;

        for file in written {
            println!("{}", file.display());
        }
        Ok(())
    }
}
