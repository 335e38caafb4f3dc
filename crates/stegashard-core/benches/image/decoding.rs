use criterion::{criterion_group, criterion_main, Criterion};
use image::{Rgb, RgbImage};
use stegashard_core::{embed_fragment, extract, CarrierImage, EmbedOptions, ExtractOptions, Fragment};

pub fn image_decoding(c: &mut Criterion) {
    let carrier = CarrierImage::from_rgb(RgbImage::from_fn(256, 256, |x, y| {
        Rgb([x as u8, y as u8, (x ^ y) as u8])
    }));
    let fragment = Fragment::new(1, 4, vec![0xA5; 4096]);
    let stego = embed_fragment(&carrier, &fragment, &EmbedOptions::default())
        .expect("Cannot hide fragment");

    c.bench_function("Image Decoding", |b| {
        b.iter(|| {
            extract(&stego, &ExtractOptions::default()).expect("Failed to extract fragment")
        })
    });

    c.bench_function("Image Decoding Single Channel Fallback", |b| {
        let stego = embed_fragment(
            &carrier,
            &fragment,
            &EmbedOptions::with_channels(stegashard_core::Channels::RED),
        )
        .expect("Cannot hide fragment");

        b.iter(|| {
            extract(&stego, &ExtractOptions::default()).expect("Failed to extract fragment")
        })
    });
}

criterion_group!(benches, image_decoding);
criterion_main!(benches);
