//! Colour samplers evaluated at a surface point and its UV coordinates.

use std::path::Path;

use rand::RngCore;
use sawass_math::{Color, Vec2, Vec3};

use crate::perlin::{Perlin, DEFAULT_TURBULENCE_DEPTH};
use crate::{TracerError, TracerResult};

/// Default spatial frequency of the checker pattern.
pub const DEFAULT_CHECKER_FREQUENCY: f32 = 10.0;

/// Returned by an image texture with no pixels, loud enough to spot in a render.
const MISSING_IMAGE_COLOR: Color = Color::new(1.0, 0.0, 1.0);

/// A texture.
///
/// Nested textures and pixel buffers are owned by the variant that holds them.
#[derive(Clone, Debug)]
pub enum Texture {
    /// A single colour everywhere.
    Constant(Color),
    /// 3D checkerboard alternating between two textures.
    Checker {
        odd: Box<Texture>,
        even: Box<Texture>,
        frequency: f32,
    },
    /// Marble-like grey pattern driven by Perlin turbulence.
    Noise { scale: f32, perlin: Perlin },
    /// Nearest-sampled image.
    Image(ImageTexture),
}

impl Texture {
    pub fn constant(color: Color) -> Self {
        Texture::Constant(color)
    }

    pub fn checker(odd: impl Into<Texture>, even: impl Into<Texture>) -> Self {
        Self::checker_with_frequency(odd, even, DEFAULT_CHECKER_FREQUENCY)
    }

    pub fn checker_with_frequency(
        odd: impl Into<Texture>,
        even: impl Into<Texture>,
        frequency: f32,
    ) -> Self {
        Texture::Checker {
            odd: Box::new(odd.into()),
            even: Box::new(even.into()),
            frequency,
        }
    }

    /// Noise texture whose gradient lattice is drawn from `rng`.
    pub fn noise(scale: f32, rng: &mut dyn RngCore) -> Self {
        Texture::Noise {
            scale,
            perlin: Perlin::new(rng),
        }
    }

    pub fn image(image: ImageTexture) -> Self {
        Texture::Image(image)
    }

    /// Sample the texture at `uv` / `p`.
    pub fn value(&self, uv: Vec2, p: Vec3) -> Color {
        match self {
            Texture::Constant(color) => *color,
            Texture::Checker {
                odd,
                even,
                frequency,
            } => {
                let sines = (frequency * p.x).sin() * (frequency * p.y).sin() * (frequency * p.z).sin();
                if sines < 0.0 {
                    odd.value(uv, p)
                } else {
                    even.value(uv, p)
                }
            }
            Texture::Noise { scale, perlin } => {
                let turb = perlin.turbulence(p, DEFAULT_TURBULENCE_DEPTH);
                Color::splat(0.5 * (1.0 + (scale * p.z + 10.0 * turb).sin()))
            }
            Texture::Image(image) => image.sample(uv),
        }
    }
}

impl From<Color> for Texture {
    fn from(color: Color) -> Self {
        Texture::Constant(color)
    }
}

impl From<ImageTexture> for Texture {
    fn from(image: ImageTexture) -> Self {
        Texture::Image(image)
    }
}

/// Decoded image stored as linear 0-1 colours, row-major, row 0 at the top.
#[derive(Clone, Debug)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl ImageTexture {
    /// Build from an 8-bit buffer with 1 (grey), 3 (RGB) or 4 (RGBA) channels.
    /// Alpha is dropped.
    pub fn from_bytes(width: u32, height: u32, channels: u32, bytes: &[u8]) -> TracerResult<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if !matches!(channels, 1 | 3 | 4) || bytes.len() != expected {
            return Err(TracerError::InvalidImageBuffer {
                width,
                height,
                channels,
                len: bytes.len(),
            });
        }

        let to_unit = |b: u8| b as f32 / 255.0;
        let pixels = bytes
            .chunks_exact(channels as usize)
            .map(|px| match px {
                [g] => Color::splat(to_unit(*g)),
                [r, g, b, ..] => Color::new(to_unit(*r), to_unit(*g), to_unit(*b)),
                _ => MISSING_IMAGE_COLOR,
            })
            .collect();

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an image file (any format the `image` crate understands).
    pub fn open(path: impl AsRef<Path>) -> TracerResult<Self> {
        let path = path.as_ref();
        let rgb = image::open(path)?.to_rgb8();
        let (width, height) = rgb.dimensions();

        log::debug!("Loaded texture: {} ({}x{})", path.display(), width, height);

        Self::from_bytes(width, height, 3, rgb.as_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Nearest-sample lookup. UVs are clamped to `[0, 1]`; `v = 1` is the
    /// top row.
    pub fn sample(&self, uv: Vec2) -> Color {
        if self.width == 0 || self.height == 0 {
            return MISSING_IMAGE_COLOR;
        }

        let u = uv.x.clamp(0.0, 1.0);
        let v = uv.y.clamp(0.0, 1.0);

        // Negative floats saturate to 0 when cast to u32.
        let i = ((u * self.width as f32) as u32).min(self.width - 1);
        let j = (((1.0 - v) * self.height as f32 - 0.001) as u32).min(self.height - 1);

        self.pixels
            .get((j * self.width + i) as usize)
            .copied()
            .unwrap_or(MISSING_IMAGE_COLOR)
    }
}
