use std::io::Read;
use std::path::Path;

use log::debug;

use crate::fragment::Fragment;
use crate::header::{Decoded, Header, DEFAULT_PROBE_BYTES};
use crate::media::{CarrierImage, Channels, LsbCodec};
use crate::result::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// how many bytes are read first when looking for a header, doubled once if the header does not fit
    pub probe_bytes: usize,
    /// pins the channel count, `None` tries 3, 2 and then 1 channels
    pub channels: Option<Channels>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            probe_bytes: DEFAULT_PROBE_BYTES,
            channels: None,
        }
    }
}

/// Recovers the fragment hidden in `image`.
///
/// `None` means the image does not carry a (readable) fragment, this is not an error.
pub fn extract(image: &CarrierImage, options: &ExtractOptions) -> Option<Fragment> {
    match options.channels {
        Some(channels) => extract_with_channels(image, channels, options.probe_bytes),
        None => Channels::PROBE_ORDER
            .iter()
            .find_map(|channels| extract_with_channels(image, *channels, options.probe_bytes)),
    }
}

/// Opens `path` and extracts from it, failing only if the image cannot be opened.
pub fn extract_file(path: &Path, options: &ExtractOptions) -> Result<Option<Fragment>> {
    let image = CarrierImage::open(path)?;
    Ok(extract(&image, options))
}

pub fn extract_with_channels(
    image: &CarrierImage,
    channels: Channels,
    probe_bytes: usize,
) -> Option<Fragment> {
    let (header, header_len) = match Header::parse(&read_prefix(image, channels, probe_bytes)) {
        Decoded::Header(header, len) => (header, len),
        Decoded::NoMagic | Decoded::Invalid => return None,
        Decoded::Truncated => {
            debug!("header longer than {probe_bytes} bytes, probing twice as much");
            Header::decode(&read_prefix(image, channels, probe_bytes.saturating_mul(2)))?
        }
    };

    if header.index == 0 || header.index > header.total {
        debug!(
            "rejecting header with fragment index {} of {}",
            header.index, header.total
        );
        return None;
    }

    let total_bits_needed = (header_len as u64 + header.length) * 8;
    let available_bits = image.capacity(channels);
    if total_bits_needed > available_bits {
        debug!(
            "header declares {} payload bytes, needs {total_bits_needed} bits but only {available_bits} are available",
            header.length
        );
        return None;
    }

    let mut buf = vec![0; header_len + header.length as usize];
    LsbCodec::decoder(image.as_rgb(), channels)
        .read_exact(&mut buf)
        .ok()?;
    let payload = buf.split_off(header_len);

    Some(Fragment::new(header.index, header.total, payload))
}

fn read_prefix(image: &CarrierImage, channels: Channels, bytes: usize) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(bytes);
    let read = LsbCodec::decoder(image.as_rgb(), channels)
        .take(bytes as u64)
        .read_to_end(&mut prefix);
    if let Err(e) = read {
        debug!("reading header prefix failed: {e}");
    }
    prefix
}
