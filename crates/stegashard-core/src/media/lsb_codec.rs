use std::io::{self, Cursor, ErrorKind, Read, Write};

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use image::{Rgb, RgbImage};

use super::carrier::Channels;
use super::iterators::{ColorIter, ColorIterMut};

pub trait HideBit {
    fn hide_bit(self, bit: bool);
}

impl HideBit for &mut u8 {
    fn hide_bit(self, bit: bool) {
        *self = (*self & (u8::MAX - 1)) | u8::from(bit);
    }
}

/// Writes bytes MSB first into the least significant bits of an image's color channels.
///
/// Only whole bytes are written. Once less than 8 channels are left, `write` returns `0`,
/// which `write_all` turns into `ErrorKind::WriteZero`.
pub struct LsbWriter<'a> {
    colors: ColorIterMut<'a, Rgb<u8>>,
    remaining_bits: u64,
}

impl Write for LsbWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let bytes = buf.len().min((self.remaining_bits / 8) as usize);
        let mut bits = BitReader::endian(Cursor::new(&buf[..bytes]), BigEndian);

        for _ in 0..bytes * 8 {
            let bit = bits.read_bit()?;
            let color = self
                .colors
                .next()
                .ok_or_else(|| io::Error::from(ErrorKind::WriteZero))?;
            color.hide_bit(bit);
        }
        self.remaining_bits -= bytes as u64 * 8;

        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads bytes back from the least significant bits, in the same order [`LsbWriter`] wrote them.
///
/// A trailing partial byte is never returned.
pub struct LsbReader<'a> {
    colors: ColorIter<'a, Rgb<u8>>,
    remaining_bits: u64,
}

impl Read for LsbReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let bytes = buf.len().min((self.remaining_bits / 8) as usize);
        let mut bits = BitWriter::endian(Vec::with_capacity(bytes), BigEndian);

        for _ in 0..bytes * 8 {
            let color = self
                .colors
                .next()
                .ok_or_else(|| io::Error::from(ErrorKind::UnexpectedEof))?;
            bits.write_bit(color & 1 == 1)?;
        }
        self.remaining_bits -= bytes as u64 * 8;

        let unveiled = bits.into_writer();
        buf[..bytes].copy_from_slice(&unveiled);

        Ok(bytes)
    }
}

/// Factory for decoder and encoder
pub struct LsbCodec;

impl LsbCodec {
    /// builds a LSB image decoder that implements Read
    pub fn decoder(input: &RgbImage, channels: Channels) -> LsbReader<'_> {
        LsbReader {
            remaining_bits: bit_capacity(input, channels),
            colors: ColorIter::from_pixels(input.pixels(), channels.get() as usize),
        }
    }

    /// builds a LSB image encoder that implements Write
    pub fn encoder(carrier: &mut RgbImage, channels: Channels) -> LsbWriter<'_> {
        LsbWriter {
            remaining_bits: bit_capacity(carrier, channels),
            colors: ColorIterMut::from_pixels_mut(carrier.pixels_mut(), channels.get() as usize),
        }
    }
}

fn bit_capacity(image: &RgbImage, channels: Channels) -> u64 {
    image.width() as u64 * image.height() as u64 * channels.get() as u64
}
