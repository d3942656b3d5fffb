use std::{
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};

use glam::Vec2;
use ndarray::Array2;
use thiserror::Error;

use crate::{as_bytes::AsBytes, encode::frame_path};

/// Largest section, in bytes, the decoder will allocate for.
pub const MAX_SECTION_BYTES: usize = 1 << 30;

pub struct FluidDataDecoder {
    /// The path to the directory in which the fluid data resides.
    path: PathBuf,
    num_frames: u64,
    /// Array shape, `(ny, nx)`.
    dim: (usize, usize),
    current_frame: u64,
}

impl FluidDataDecoder {
    pub fn new(path: PathBuf) -> FluidDataDecoder {
        Self {
            path,
            num_frames: 0,
            dim: (0, 0),
            current_frame: 0,
        }
    }

    fn read_value<const N: usize, T: AsBytes<N>, R: Read>(reader: &mut R) -> Result<T, DecodingError> {
        let mut bytes = [0; N];
        reader.read_exact(&mut bytes)?;

        Ok(T::from_bytes(bytes))
    }

    /// Reads a length-prefixed section that must hold exactly `expected` values.
    fn read_section<const N: usize, T: AsBytes<N>, R: Read>(
        reader: &mut R,
        expected: usize,
    ) -> Result<Vec<T>, DecodingError> {
        let size = N
            .checked_mul(expected)
            .filter(|&size| size <= MAX_SECTION_BYTES)
            .ok_or(DecodingError::TooLarge {
                values: expected as u64,
                width: N,
            })?;

        let len = Self::read_value::<8, u64, _>(reader)?;
        if len != expected as u64 {
            return Err(DecodingError::SectionLength { expected, found: len });
        }

        let mut bytes = vec![0; size];
        reader.read_exact(&mut bytes)?;

        Ok(bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut b = [0; N];
                b.copy_from_slice(chunk);
                T::from_bytes(b)
            })
            .collect())
    }

    pub fn decode_metadata(&mut self) -> Result<FluidMetadata, DecodingError> {
        let path = self.path.join("_meta");
        let mut reader = BufReader::new(File::open(path)?);

        let dt = Self::read_value::<4, f32, _>(&mut reader)?;
        let num_frames = Self::read_value::<8, u64, _>(&mut reader)?;
        let nx = Self::read_value::<4, u32, _>(&mut reader)? as usize;
        let ny = Self::read_value::<4, u32, _>(&mut reader)? as usize;
        let dx = Self::read_value::<4, f32, _>(&mut reader)?;
        let dy = Self::read_value::<4, f32, _>(&mut reader)?;

        let cells = nx.checked_mul(ny).ok_or(DecodingError::TooLarge {
            values: nx as u64 * ny as u64,
            width: 1,
        })?;
        let walls = Self::read_section::<1, bool, _>(&mut reader, cells)?;
        let walls = Array2::from_shape_vec((ny, nx), walls)?;

        self.num_frames = num_frames;
        self.dim = (ny, nx);
        self.current_frame = 0;

        Ok(FluidMetadata {
            dt,
            num_frames,
            nx,
            ny,
            dx,
            dy,
            walls,
        })
    }

    /// Decodes the next frame, or `None` once every recorded frame has been read.
    ///
    /// [`decode_metadata`](Self::decode_metadata) must be called first.
    pub fn decode_frame(&mut self) -> Result<Option<FluidFrameData>, DecodingError> {
        if self.current_frame >= self.num_frames {
            return Ok(None);
        }

        let path = frame_path(&self.path, self.num_frames, self.current_frame);
        let mut reader = BufReader::new(File::open(path)?);
        let n = self.dim.0 * self.dim.1;

        let density = Self::read_section::<4, f32, _>(&mut reader, n)?;
        let velocity = Self::read_section::<8, Vec2, _>(&mut reader, n)?;

        self.current_frame += 1;

        Ok(Some(FluidFrameData {
            density: Array2::from_shape_vec(self.dim, density)?,
            velocity: Array2::from_shape_vec(self.dim, velocity)?,
        }))
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
    }
}

#[derive(Debug, Clone)]
pub struct FluidMetadata {
    pub dt: f32,
    pub num_frames: u64,
    pub nx: usize,
    pub ny: usize,
    pub dx: f32,
    pub dy: f32,
    pub walls: Array2<bool>,
}

#[derive(Debug, Clone)]
pub struct FluidFrameData {
    /// Smoke density, `(ny, nx)`.
    pub density: Array2<f32>,
    /// Cell velocity, `(ny, nx)`.
    pub velocity: Array2<Vec2>,
}

impl FluidFrameData {
    pub fn total_smoke(&self) -> f32 {
        self.density.sum()
    }

    pub fn max_speed(&self) -> f32 {
        self.velocity.iter().map(|v| v.length()).fold(0.0, f32::max)
    }
}

#[derive(Debug, Error)]
pub enum DecodingError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("section holds {found} values, expected {expected}")]
    SectionLength { expected: usize, found: u64 },

    #[error("section of {values} values of {width} bytes exceeds the decoder size limit")]
    TooLarge { values: u64, width: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
