//! Single-threaded render driver.
//!
//! Walks the image row by row, averages a stratified set of camera samples
//! per pixel through [`generate_color`](crate::generate_color), and stores
//! linear colour. Gamma correction happens when converting to bytes.

use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sawass_math::{clamp, Vec2};
use serde::{Deserialize, Serialize};

use crate::{
    gen_f32, generate_color, Background, Camera, Color, IntegratorSettings, Scene, TracerResult,
    DEFAULT_MAX_DEPTH, MAX_TRACE_DEPTH, SHADOW_EPSILON,
};

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// What rays that miss everything see
    pub background: Background,
    /// Seed of the render's random number generator
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 480,
            samples_per_pixel: 30,
            max_depth: DEFAULT_MAX_DEPTH,
            background: Background::Sky,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Width over height, 1 for a degenerate image.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Integrator settings for this render, with the depth capped.
    pub fn integrator_settings(&self) -> IntegratorSettings {
        if self.max_depth > MAX_TRACE_DEPTH {
            log::warn!(
                "max_depth {} exceeds the limit, clamping to {}",
                self.max_depth,
                MAX_TRACE_DEPTH
            );
        }
        IntegratorSettings {
            max_depth: self.max_depth.min(MAX_TRACE_DEPTH),
            t_min: SHADOW_EPSILON,
            background: self.background,
        }
    }

    fn effective_samples(&self) -> u32 {
        self.samples_per_pixel.max(1)
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGB.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    let channel = |c: f32| (255.99 * clamp(linear_to_gamma(c), 0.0, 1.0)) as u8;
    [channel(color.x), channel(color.y), channel(color.z)]
}

/// Sub-pixel sample positions in `[0, 1)²` for one pixel.
///
/// The first `k²` samples (`k = ⌊√n⌋`) are jittered inside the cells of a
/// `k × k` grid; the remaining `n - k²` are uniform over the whole pixel.
/// Every sample has the pixel centre as its expected position.
pub fn pixel_offsets(samples: u32, rng: &mut dyn RngCore) -> Vec<Vec2> {
    let grid = (samples as f32).sqrt().floor() as u32;
    // Guard against sqrt rounding for large perfect squares
    let grid = if (grid + 1) * (grid + 1) <= samples { grid + 1 } else { grid };
    let cell = 1.0 / grid.max(1) as f32;

    let mut offsets = Vec::with_capacity(samples as usize);
    for j in 0..grid {
        for i in 0..grid {
            let sx = (i as f32 + gen_f32(rng)) * cell;
            let sy = (j as f32 + gen_f32(rng)) * cell;
            offsets.push(Vec2::new(sx, sy));
        }
    }
    while offsets.len() < samples as usize {
        offsets.push(Vec2::new(gen_f32(rng), gen_f32(rng)));
    }
    offsets
}

/// Average the radiance of `samples_per_pixel` camera rays through pixel
/// `(x, y)`, with `y` counted from the bottom row.
///
/// Sample positions come from [`pixel_offsets`].
pub fn render_pixel(
    camera: &Camera,
    scene: &Scene,
    x: u32,
    y: u32,
    config: &RenderConfig,
    settings: &IntegratorSettings,
    rng: &mut dyn RngCore,
) -> Color {
    let samples = config.effective_samples();
    let inv_width = 1.0 / config.width.max(1) as f32;
    let inv_height = 1.0 / config.height.max(1) as f32;

    let mut pixel_color = Color::ZERO;
    for offset in pixel_offsets(samples, rng) {
        let s = (x as f32 + offset.x) * inv_width;
        let t = (y as f32 + offset.y) * inv_height;

        let ray = camera.trace_ray(s, t, rng);
        pixel_color += generate_color(&ray, scene, ray.time(), 0, settings, rng);
    }

    pixel_color / samples as f32
}

/// Simple image buffer for storing render output. Row 0 is the top row.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Convert to gamma-corrected RGB bytes, row-major from the top.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixels.len() * 3);
        for color in &self.pixels {
            bytes.extend_from_slice(&color_to_rgb8(*color));
        }
        bytes
    }

    /// Encode as PNG at `path`.
    pub fn save_png(&self, path: impl AsRef<Path>) -> TracerResult<()> {
        let path = path.as_ref();
        image::save_buffer_with_format(
            path,
            &self.to_rgb8(),
            self.width,
            self.height,
            image::ColorType::Rgb8,
            image::ImageFormat::Png,
        )?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

/// Render the entire scene to an image buffer.
///
/// The random number generator is seeded from `config.seed`, so equal
/// inputs give identical images.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> ImageBuffer {
    if config.samples_per_pixel == 0 {
        log::warn!("samples_per_pixel is 0, using 1");
    }

    let settings = config.integrator_settings();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut image = ImageBuffer::new(config.width, config.height);

    log::info!(
        "Rendering {}x{} at {} spp, max depth {} ({} entities{})",
        config.width,
        config.height,
        config.effective_samples(),
        settings.max_depth,
        scene.len(),
        if scene.is_accelerated() { ", BVH" } else { "" }
    );
    let start = Instant::now();

    let progress_step = (config.height / 10).max(1);
    for row in 0..config.height {
        let y = config.height - 1 - row;
        for x in 0..config.width {
            let color = render_pixel(camera, scene, x, y, config, &settings, &mut rng);
            image.set(x, row, color);
        }

        let done = row + 1;
        if done % progress_step == 0 || done == config.height {
            log::info!(
                "{:.0}% completed",
                done as f32 / config.height as f32 * 100.0
            );
        }
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}
