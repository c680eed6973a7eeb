//! Errors raised while building scenes or moving pixels in and out of files.
//!
//! Physically possible outcomes (a ray missing everything, absorption, total
//! internal reflection, the depth cutoff) are not errors and never show up
//! here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TracerError {
    #[error("Entity {index} has no bounding box over time [{t0}, {t1}]")]
    MissingBoundingBox { index: usize, t0: f32, t1: f32 },

    #[error("Image buffer of {len} bytes does not describe a {width}x{height} image with {channels} channel(s)")]
    InvalidImageBuffer {
        width: u32,
        height: u32,
        channels: u32,
        len: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type TracerResult<T> = Result<T, TracerError>;
