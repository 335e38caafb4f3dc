pub mod carrier;
mod iterators;
pub mod lsb_codec;

pub use carrier::{is_image_file, list_images, CarrierImage, Channels, IMAGE_EXTENSIONS};
pub use lsb_codec::{HideBit, LsbCodec, LsbReader, LsbWriter};
