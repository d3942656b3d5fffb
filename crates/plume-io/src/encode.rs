use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use thiserror::Error;

use plume_fluids::{scene::Scene, Fluid};

use crate::EncodeFluid;

use super::as_bytes::AsBytes;

pub struct FluidDataEncoder {
    /// The path to the directory into which the fluid data will be placed.
    path: PathBuf,
    num_frames: u64,
    current_frame: u64,
}

impl FluidDataEncoder {
    /// Creates the output directory, and any missing parents, for a recording of `num_frames`.
    pub fn new(path: PathBuf, num_frames: u64) -> Result<FluidDataEncoder, EncodingError> {
        std::fs::create_dir_all(&path)?;

        Ok(Self {
            path,
            num_frames,
            current_frame: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.current_frame
    }

    pub(crate) fn frame_path(&self, frame: u64) -> PathBuf {
        frame_path(&self.path, self.num_frames, frame)
    }

    /// Writes `_meta`: the timestep and frame count, followed by the fluid's own header.
    pub fn encode_metadata<F>(&mut self, scene: &Scene<F>) -> Result<(), EncodingError>
    where
        F: Fluid + EncodeFluid,
    {
        let path = self.path.join("_meta");
        let mut encoder = FluidFrameEncoder::new(File::create(path)?);

        encoder.encode_value(scene.dt())?;
        encoder.encode_value(self.num_frames)?;
        scene.fluid.encode_header(&mut encoder)?;

        encoder.finish()
    }

    pub fn encode_frame<F>(&mut self, scene: &Scene<F>) -> Result<(), EncodingError>
    where
        F: Fluid + EncodeFluid,
    {
        if self.current_frame >= self.num_frames {
            return Err(EncodingError::TooManyFrames(self.num_frames));
        }

        let path = self.frame_path(self.current_frame);
        let mut encoder = FluidFrameEncoder::new(File::create(path)?);

        scene.fluid.encode_state(&mut encoder)?;
        encoder.finish()?;

        self.current_frame += 1;

        Ok(())
    }
}

/// `NNN.dat`, zero-padded to the width of the last frame index.
pub(crate) fn frame_path(dir: &std::path::Path, num_frames: u64, frame: u64) -> PathBuf {
    let max_digits = num_frames.saturating_sub(1).checked_ilog10().unwrap_or(0) + 1;
    let digits = frame.checked_ilog10().unwrap_or(0) + 1;
    let zeros = max_digits.saturating_sub(digits);

    dir.join(format!("{}{frame}.dat", "0".repeat(zeros as usize)))
}

pub struct FluidFrameEncoder<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> FluidFrameEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    pub fn encode_value<const N: usize, T: AsBytes<N>>(&mut self, value: T) -> Result<(), EncodingError> {
        self.writer.write_all(&value.to_bytes())?;

        Ok(())
    }

    /// Writes `len` followed by the packed values.
    pub fn encode_section<const N: usize, T, I>(&mut self, len: usize, values: I) -> Result<(), EncodingError>
    where
        I: Iterator<Item = T>,
        T: AsBytes<N>,
    {
        self.writer.write_all(&(len as u64).to_ne_bytes())?;

        let bytes: Vec<_> = values.flat_map(|v| v.to_bytes()).collect();
        if bytes.len() != len * N {
            return Err(EncodingError::SectionLength {
                expected: len,
                found: bytes.len() / N,
            });
        }

        self.writer.write_all(&bytes)?;

        Ok(())
    }

    pub fn finish(mut self) -> Result<(), EncodingError> {
        self.writer.flush()?;

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("recording holds at most {0} frames")]
    TooManyFrames(u64),

    #[error("section declared {expected} values but {found} were given")]
    SectionLength { expected: usize, found: usize },
}
