// Raster encoding example
use gifx::write_image;
use pix::rgb::SRgba8;
use pix::Raster;
use std::error::Error;
use std::fs::File;

fn main() -> Result<(), Box<dyn Error>> {
    let mut raster = Raster::with_clear(4, 4);
    for i in 0..4 {
        *raster.pixel_mut(i, i) = SRgba8::new(0xFF, 0, 0, 0xFF);
    }
    let f = File::create("enc.gif")?;
    write_image(f, &raster, Some("<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>"))?;
    Ok(())
}
