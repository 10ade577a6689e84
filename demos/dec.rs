// GIF information example
use gifx::{read_info, read_metadata};
use std::env;
use std::error::Error;
use std::fs::File;

fn main() -> Result<(), Box<dyn Error>> {
    let path = env::args().nth(1).expect("usage: dec [filename]");
    let info = read_info(File::open(&path)?)?;
    let v = info.version();
    println!(
        "GIF{}{}{}, {}x{}, {} frame(s), {} bpp",
        v[0] as char,
        v[1] as char,
        v[2] as char,
        info.width(),
        info.height(),
        info.frame_count(),
        info.bits_per_pixel(),
    );
    for comment in info.comments() {
        println!("  # {}", comment);
    }
    let metadata = read_metadata(File::open(&path)?)?;
    for (n, frame) in metadata.frames().iter().enumerate() {
        println!(
            "frame {}: delay {:5.2} at {},{} {:?}",
            n,
            frame.delay_time_cs() as f32 / 100.0,
            frame.left(),
            frame.top(),
            frame.disposal_method(),
        );
    }
    Ok(())
}
