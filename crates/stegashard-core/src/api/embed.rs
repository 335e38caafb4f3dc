use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::embed::{embed_fragment, EmbedOptions};
use crate::error::ShardError;
use crate::fragment::{list_fragment_files, Fragment};
use crate::media::{list_images, CarrierImage, Channels};

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

#[derive(Default, Debug)]
pub struct EmbedApi {
    fragments_folder: Option<PathBuf>,
    images_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
    options: EmbedOptions,
}

impl EmbedApi {
    /// Folder holding the `part_*.bin` files
    pub fn from_fragments_folder<A: AsRef<Path>>(mut self, folder: A) -> Self {
        self.fragments_folder = Some(folder.as_ref().to_path_buf());
        self
    }

    /// Folder holding the plain carrier images, the i-th image in name order takes the i-th fragment
    pub fn with_images_folder<A: AsRef<Path>>(mut self, folder: A) -> Self {
        self.images_folder = Some(folder.as_ref().to_path_buf());
        self
    }

    pub fn into_output_folder<A: AsRef<Path>>(mut self, folder: A) -> Self {
        self.output_folder = Some(folder.as_ref().to_path_buf());
        self
    }

    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.options.channels = channels;
        self
    }

    pub fn with_options(mut self, options: EmbedOptions) -> Self {
        self.options = options;
        self
    }

    /// Hides every fragment in its own carrier and returns the written stego images.
    pub fn execute(self) -> Result<Vec<PathBuf>, ShardError> {
        let Some(fragments_folder) = self.fragments_folder else {
            return Err(ShardError::MissingArgument("fragments folder"));
        };
        let Some(images_folder) = self.images_folder else {
            return Err(ShardError::MissingArgument("images folder"));
        };
        let Some(output_folder) = self.output_folder else {
            return Err(ShardError::MissingArgument("output folder"));
        };

        let parts = list_fragment_files(&fragments_folder)?;
        if parts.is_empty() {
            return Err(ShardError::NoFragmentFiles(fragments_folder));
        }
        let images = list_images(&images_folder)?;
        if images.len() < parts.len() {
            return Err(ShardError::NotEnoughCarriers {
                images: images.len(),
                fragments: parts.len(),
            });
        }

        fs::create_dir_all(&output_folder).map_err(|source| ShardError::WriteError { source })?;

        let total = u32::try_from(parts.len()).map_err(|_| ShardError::HeaderFieldOverflow {
            field: "total",
            value: parts.len() as u64,
            width: crate::header::TOTAL_DIGITS,
        })?;
        let mut written = Vec::with_capacity(parts.len());
        for (i, (part, image)) in parts.iter().zip(images.iter()).enumerate() {
            let index = i as u32 + 1;
            let payload = fs::read(part).map_err(|source| ShardError::ReadError { source })?;
            let fragment = Fragment::new(index, total, payload);

            let carrier = CarrierImage::open(image)?;
            let stego = embed_fragment(&carrier, &fragment, &self.options)?;

            let target = output_folder.join(stego_file_name(index, image));
            stego.save_png(&target)?;
            info!(
                "{:?} -> {:?} ({} of {} bits used)",
                part,
                target,
                fragment.to_wire()?.len() * 8,
                carrier.capacity(self.options.channels)
            );
            written.push(target);
        }

        Ok(written)
    }
}

/// `stego_<ii>_<carrier stem>.png`
pub fn stego_file_name(index: u32, carrier: &Path) -> String {
    let stem = carrier
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("stego_{index:02}_{stem}.png")
}
