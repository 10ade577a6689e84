use bencher::{benchmark_group, benchmark_main, black_box, Bencher};
use gifx::{read_first_frame, write_image};
use pix::rgb::SRgba8;
use pix::Raster;

fn test_raster() -> Raster<SRgba8> {
    let mut raster = Raster::with_clear(64, 64);
    for y in 0..64 {
        for x in 0..64 {
            let i = ((x + y) % 16) as u8;
            *raster.pixel_mut(x, y) = SRgba8::new(i * 16, 0x80, i * 8, 0xFF);
        }
    }
    raster
}

fn encode_raster(bencher: &mut Bencher) {
    let raster = test_raster();
    bencher.iter(|| {
        let mut bytes = vec![];
        write_image(&mut bytes, black_box(&raster), None).unwrap();
        black_box(bytes);
    });
}

fn decode_raster(bencher: &mut Bencher) {
    let mut gif = vec![];
    write_image(&mut gif, &test_raster(), None).unwrap();
    bencher.iter(|| {
        black_box(read_first_frame(black_box(&gif[..])).unwrap());
    });
}

benchmark_group!(benches, encode_raster, decode_raster);
benchmark_main!(benches);
