use std::path::PathBuf;

use plume_io::decode::FluidDataDecoder;

use crate::RunError;

/// Prints the grid layout of a recording, then one summary line per frame.
pub fn inspect(path: PathBuf) -> Result<(), RunError> {
    let mut decoder = FluidDataDecoder::new(path);
    let meta = decoder.decode_metadata()?;

    let walls = meta.walls.iter().filter(|&&solid| solid).count();
    println!(
        "{} x {} cells, dx = {}, dy = {}, dt = {}, {} wall cells, {} frames",
        meta.nx, meta.ny, meta.dx, meta.dy, meta.dt, walls, meta.num_frames,
    );
    println!("{:>8}  {:>14}  {:>12}", "frame", "total smoke", "max speed");

    let mut frame = 0;
    while let Some(data) = decoder.decode_frame()? {
        println!("{frame:>8}  {:>14.4}  {:>12.4}", data.total_smoke(), data.max_speed());
        frame += 1;
    }

    Ok(())
}
