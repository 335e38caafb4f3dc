use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use stegashard_core::{embed_fragment, CarrierImage, EmbedOptions, Fragment};

pub fn image_encoding(c: &mut Criterion) {
    c.bench_function("Image Encoding", |b| {
        let carrier = CarrierImage::from_rgb(RgbImage::from_fn(256, 256, |x, y| {
            Rgb([x as u8, y as u8, (x ^ y) as u8])
        }));
        let fragment = Fragment::new(1, 4, vec![0xA5; 4096]);

        b.iter(|| {
            embed_fragment(&carrier, &fragment, &EmbedOptions::default())
                .expect("Cannot hide fragment")
        })
    });
}

criterion_group!(benches, image_encoding);
criterion_main!(benches);
