//! # Stegashard Core API
//!
//! Splits a file into numbered fragments, hides every fragment with its own
//! self-describing header in the least significant bits of a carrier image,
//! scatters the stego images over a directory tree and later finds, decodes and
//! reassembles them into the original bytes.
//!
//! Every stage has a builder in [`api`]:
//! - [`api::split`] cuts a file into `part_<i>.bin` fragments plus a digest sidecar
//! - [`api::embed`] hides one fragment per carrier image
//! - [`api::distribute`] copies the stego images into destination directories
//! - [`api::reconstruct`] scans a tree, reassembles and verifies the file
//!
//! # Usage Examples
//!
//! ## Round trip through three carriers
//!
//! ```rust
//! use image::{Rgb, RgbImage};
//! use tempfile::tempdir;
//!
//! let temp_dir = tempdir().expect("Failed to create temporary directory");
//! let base = temp_dir.path();
//! std::fs::write(base.join("secret.txt"), "Hello World!").unwrap();
//! std::fs::create_dir_all(base.join("images")).unwrap();
//! for name in ["a.png", "b.png", "c.png"] {
//!     RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8, y as u8, 200]))
//!         .save(base.join("images").join(name))
//!         .unwrap();
//! }
//!
//! stegashard_core::api::split::prepare()
//!     .with_source(base.join("secret.txt"))
//!     .into_output_folder(base.join("fragments"))
//!     .with_fragments(3)
//!     .execute()
//!     .expect("Failed to split file");
//!
//! stegashard_core::api::embed::prepare()
//!     .from_fragments_folder(base.join("fragments"))
//!     .with_images_folder(base.join("images"))
//!     .into_output_folder(base.join("stego"))
//!     .execute()
//!     .expect("Failed to hide fragments");
//!
//! let report = stegashard_core::api::reconstruct::prepare()
//!     .from_root(base.join("stego"))
//!     .into_output_folder(base.join("fragments"))
//!     .execute()
//!     .expect("Failed to reconstruct file");
//!
//! assert!(report.check.is_ok());
//! assert_eq!(std::fs::read(report.output_file).unwrap(), b"Hello World!");
//! ```

#![warn(clippy::redundant_else)]

pub mod api;
pub mod distribute;
pub mod embed;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod header;
pub mod media;
pub mod reassemble;
pub mod result;
pub mod scan;

pub use crate::distribute::{DestinationSet, DistributionPlan, MappingTable, Placement, PlacementMode};
pub use crate::embed::{embed, embed_fragment, EmbedOptions};
pub use crate::error::{ErrorCategory, ShardError};
pub use crate::extract::{extract, extract_file, ExtractOptions};
pub use crate::fragment::{digest, split, split_file, Fragment, SplitReport};
pub use crate::header::Header;
pub use crate::media::{CarrierImage, Channels};
pub use crate::reassemble::{reassemble, verify, DigestCheck, Executor, ProcessExecutor};
pub use crate::result::Result;
pub use crate::scan::{ReassemblyState, ScanReport, Scanner};

#[cfg(test)]
mod test_utils {
    use image::{ImageBuffer, Rgb, RgbImage};

    use crate::media::CarrierImage;

    /// This image has some traits:
    /// --------------x-------------
    /// | 0,0 -> (0, 1, 2 )  | 1,0 -> (3, 4, 5 )  | ...
    /// | 0,1 -> (12,13,14)  | 1,1 -> (15,16,17)  | ...
    /// | 0,2 -> (24,25,26)  | ..
    /// y
    pub fn prepare_4x3_linear_growing_colors() -> RgbImage {
        ImageBuffer::from_fn(4, 3, |x, y| {
            let i = (3 * (x + 4 * y)) as u8;
            Rgb([i, i + 1, i + 2])
        })
    }

    /// a carrier filled with reproducible pseudo noise, different seeds give different pixels
    pub fn prepare_noise_carrier(width: u32, height: u32, seed: u32) -> CarrierImage {
        CarrierImage::from_rgb(ImageBuffer::from_fn(width, height, |x, y| {
            let mut v = x
                .wrapping_mul(0x9E37_79B9)
                ^ y.wrapping_mul(0x85EB_CA6B)
                ^ seed.wrapping_mul(0xC2B2_AE35);
            v ^= v >> 15;
            v = v.wrapping_mul(0x2C1B_3C6D);
            v ^= v >> 12;
            let [r, g, b, _] = v.to_le_bytes();
            Rgb([r, g, b])
        }))
    }
}
