use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbImage};
use log::error;

use crate::error::ShardError;
use crate::result::Result;

/// extensions accepted when reading carrier images, compared case-insensitive
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Number of color channels per pixel that carry one hidden bit each.
///
/// Channels are taken in R, G, B order, so `2` uses red and green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Channels(u8);

impl Channels {
    pub const RED: Channels = Channels(1);
    pub const RED_GREEN: Channels = Channels(2);
    pub const RGB: Channels = Channels(3);

    /// the order in which the extractor tries channel counts
    pub const PROBE_ORDER: [Channels; 3] = [Self::RGB, Self::RED_GREEN, Self::RED];

    pub fn new(channels: u8) -> Result<Self> {
        match channels {
            1..=3 => Ok(Self(channels)),
            _ => Err(ShardError::InvalidChannelCount(channels)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::RGB
    }
}

impl TryFrom<u8> for Channels {
    type Error = ShardError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An 8-bit RGB image used to carry hidden data, any alpha channel is dropped on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierImage {
    image: RgbImage,
}

impl CarrierImage {
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: image.to_rgb8(),
        }
    }

    /// Opens a PNG or JPEG file and normalizes it to RGB.
    pub fn open(path: &Path) -> Result<Self> {
        if !is_image_file(path) {
            return Err(ShardError::UnsupportedMedia);
        }

        let image = image::open(path).map_err(|e| {
            log::debug!("cannot decode {path:?}: {e}");
            ShardError::InvalidImageMedia
        })?;

        Ok(Self::from_dynamic(image))
    }

    /// Writes the image as PNG, no matter what the extension of `path` says.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image
            .save_with_format(path, ImageFormat::Png)
            .map_err(|e| {
                error!("Error saving image {path:?}: {e}");
                ShardError::ImageEncodingError
            })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// how many bits fit in when `channels` color channels per pixel are used
    pub fn capacity(&self, channels: Channels) -> u64 {
        self.width() as u64 * self.height() as u64 * channels.get() as u64
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn as_rgb_mut(&mut self) -> &mut RgbImage {
        &mut self.image
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }
}

/// true if the extension of `path` is one of [`IMAGE_EXTENSIONS`]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Lists the images directly inside `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ShardError::DirectoryNotFound(dir.to_path_buf()));
    }
    let mut images: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();
    Ok(images)
}
