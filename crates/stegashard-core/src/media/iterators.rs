use image::buffer::{Pixels, PixelsMut};
use image::Pixel;
use std::iter::Take;
use std::slice::{Iter, IterMut};

/// Row-major read access to the first `take` color channels of every pixel
pub(crate) struct ColorIter<'a, P: Pixel + 'a> {
    pixels: Pixels<'a, P>,
    colors: Take<Iter<'a, P::Subpixel>>,
    take: usize,
}

impl<'a, P: Pixel + 'a> ColorIter<'a, P> {
    pub fn from_pixels(pixels: Pixels<'a, P>, take: usize) -> Self {
        let empty: &'a [P::Subpixel] = Default::default();
        Self {
            pixels,
            colors: empty.iter().take(0),
            take,
        }
    }
}

impl<'a, P: Pixel + 'a> Iterator for ColorIter<'a, P> {
    type Item = &'a P::Subpixel;

    fn next(&mut self) -> Option<Self::Item> {
        self.colors.next().or_else(|| {
            let pixel = self.pixels.next()?;
            self.colors = pixel.channels().iter().take(self.take);
            self.colors.next()
        })
    }
}

/// Row-major mutable access to the first `take` color channels of every pixel
pub(crate) struct ColorIterMut<'a, P: Pixel + 'a> {
    pixels: PixelsMut<'a, P>,
    colors: Take<IterMut<'a, P::Subpixel>>,
    take: usize,
}

impl<'a, P: Pixel + 'a> ColorIterMut<'a, P> {
    pub fn from_pixels_mut(pixels: PixelsMut<'a, P>, take: usize) -> Self {
        let empty: &'a mut [P::Subpixel] = Default::default();
        Self {
            pixels,
            colors: empty.iter_mut().take(0),
            take,
        }
    }
}

impl<'a, P: Pixel + 'a> Iterator for ColorIterMut<'a, P> {
    type Item = &'a mut P::Subpixel;

    fn next(&mut self) -> Option<Self::Item> {
        self.colors.next().or_else(|| {
            let pixel = self.pixels.next()?;
            self.colors = pixel.channels_mut().iter_mut().take(self.take);
            self.colors.next()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::prepare_4x3_linear_growing_colors;

    #[test]
    fn should_iterate_rows_first_over_all_three_colors() {
        let img = prepare_4x3_linear_growing_colors();
        let colors: Vec<u8> = ColorIter::from_pixels(img.pixels(), 3).copied().collect();

        assert_eq!(colors, (0..36).collect::<Vec<u8>>());
    }

    #[test]
    fn should_only_take_the_leading_channels() {
        let img = prepare_4x3_linear_growing_colors();
        let mut colors = ColorIter::from_pixels(img.pixels(), 2);

        assert_eq!(colors.next(), Some(&0));
        assert_eq!(colors.next(), Some(&1));
        // blue of pixel (0, 0) is skipped
        assert_eq!(colors.next(), Some(&3));
        assert_eq!(ColorIter::from_pixels(img.pixels(), 1).count(), 12);
    }

    #[test]
    fn should_be_possible_to_mutate_colors() {
        let mut img = prepare_4x3_linear_growing_colors();
        for c in ColorIterMut::from_pixels_mut(img.pixels_mut(), 1) {
            *c = 0xff;
        }

        assert_eq!(img.get_pixel(0, 0).0, [0xff, 1, 2]);
        assert_eq!(img.get_pixel(3, 2).0, [0xff, 34, 35]);
    }

    #[test]
    fn should_yield_nothing_for_an_empty_image() {
        let img = image::RgbImage::new(0, 0);
        assert_eq!(ColorIter::from_pixels(img.pixels(), 3).count(), 0);
    }
}
