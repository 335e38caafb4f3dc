use std::io::{ErrorKind, Write};

use log::{debug, error};

use crate::error::ShardError;
use crate::fragment::Fragment;
use crate::media::{CarrierImage, Channels, LsbCodec};
use crate::result::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbedOptions {
    /// how many color channels per pixel carry a bit, in R, G, B order
    pub channels: Channels,
}

impl EmbedOptions {
    pub fn with_channels(channels: Channels) -> Self {
        Self { channels }
    }
}

/// bits available in `image` when `channels` color channels per pixel are used
pub fn capacity(image: &CarrierImage, channels: Channels) -> u64 {
    image.capacity(channels)
}

/// Hides `payload` in a copy of `carrier`, the carrier itself stays untouched.
///
/// Fails with [`ShardError::CapacityExceeded`] before anything is written if the payload does not fit.
pub fn embed(carrier: &CarrierImage, payload: &[u8], options: &EmbedOptions) -> Result<CarrierImage> {
    check_capacity(carrier, payload.len(), options.channels)?;

    let mut stego = carrier.clone();
    LsbCodec::encoder(stego.as_rgb_mut(), options.channels)
        .write_all(payload)
        .map_err(|e| {
            error!("Error encoding image: {e}, kind {}", e.kind());
            match e.kind() {
                ErrorKind::WriteZero => capacity_error(carrier, payload.len(), options.channels),
                _ => ShardError::ImageEncodingError,
            }
        })?;
    debug!(
        "embedded {} bytes into {}x{} carrier",
        payload.len(),
        carrier.width(),
        carrier.height()
    );

    Ok(stego)
}

/// Hides header and payload of `fragment` in a copy of `carrier`.
pub fn embed_fragment(
    carrier: &CarrierImage,
    fragment: &Fragment,
    options: &EmbedOptions,
) -> Result<CarrierImage> {
    embed(carrier, &fragment.to_wire()?, options)
}

pub fn check_capacity(carrier: &CarrierImage, payload_len: usize, channels: Channels) -> Result<()> {
    let needed = payload_len as u64 * 8;
    if needed > carrier.capacity(channels) {
        return Err(capacity_error(carrier, payload_len, channels));
    }
    Ok(())
}

fn capacity_error(carrier: &CarrierImage, payload_len: usize, channels: Channels) -> ShardError {
    ShardError::CapacityExceeded {
        width: carrier.width(),
        height: carrier.height(),
        channels: channels.get(),
        capacity: carrier.capacity(channels),
        needed: payload_len as u64 * 8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::split;
    use crate::test_utils::prepare_noise_carrier;

    #[test]
    fn should_reject_hello_world_fragment_on_8x8_carrier() {
        let carrier = prepare_noise_carrier(8, 8, 1);
        let fragment = Fragment::new(1, 3, b"Hell".to_vec());

        match embed_fragment(&carrier, &fragment, &EmbedOptions::default()) {
            Err(ShardError::CapacityExceeded {
                capacity, needed, ..
            }) => {
                assert_eq!(capacity, 192);
                assert_eq!(needed, 224);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn should_embed_hello_world_fragments_on_10x10_carriers() {
        let fragments = Fragment::from_chunks(split(b"Hello World!", 3).unwrap());
        for (seed, fragment) in fragments.iter().enumerate() {
            let carrier = prepare_noise_carrier(10, 10, seed as u32);
            assert_eq!(capacity(&carrier, Channels::RGB), 300);
            assert!(embed_fragment(&carrier, fragment, &EmbedOptions::default()).is_ok());
        }
    }

    #[test]
    fn should_not_mutate_the_carrier() {
        let carrier = prepare_noise_carrier(10, 10, 7);
        let before = carrier.clone();
        let stego = embed(&carrier, b"some payload", &EmbedOptions::default()).unwrap();

        assert_eq!(carrier, before);
        assert_ne!(stego, carrier);
    }

    #[test]
    fn should_leave_channels_past_the_payload_untouched() {
        let carrier = prepare_noise_carrier(10, 10, 3);
        let options = EmbedOptions::with_channels(Channels::RED_GREEN);
        let stego = embed(&carrier, b"ab", &options).unwrap();

        // 16 bits over red and green need 8 pixels
        for (i, (a, b)) in carrier
            .as_rgb()
            .pixels()
            .zip(stego.as_rgb().pixels())
            .enumerate()
        {
            assert_eq!(a.0[2], b.0[2], "blue of pixel {i} changed");
            if i >= 8 {
                assert_eq!(a, b, "pixel {i} changed");
            }
        }
    }

    #[test]
    fn should_respect_the_channel_count_for_capacity() {
        let carrier = prepare_noise_carrier(10, 10, 0);
        let options = EmbedOptions::with_channels(Channels::RED);
        // 100 bits hold 12 bytes, not 13
        assert!(embed(&carrier, &[0; 12], &options).is_ok());
        assert!(matches!(
            embed(&carrier, &[0; 13], &options),
            Err(ShardError::CapacityExceeded { channels: 1, .. })
        ));
    }
}
