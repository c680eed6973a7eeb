//! Recursive path tracing integrator.
//!
//! A camera ray is followed from surface to surface. Each hit adds the
//! surface's emission and, if the material scatters, the attenuated radiance
//! carried back by the scattered ray. Rays that escape take the background.

use rand::RngCore;
use sawass_math::{lerp, Color, Ray};
use serde::{Deserialize, Serialize};

use crate::Scene;

/// Default bounce limit.
pub const DEFAULT_MAX_DEPTH: u32 = 50;

/// Hard upper bound on the bounce limit, whatever the settings ask for.
pub const MAX_TRACE_DEPTH: u32 = 512;

/// Closest accepted hit distance; keeps scattered rays from re-hitting the
/// surface they leave.
pub const SHADOW_EPSILON: f32 = 0.001;

/// What a ray sees when it leaves the scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// White-to-blue vertical gradient.
    #[default]
    Sky,
    /// Constant colour; black for scenes lit only by emitters.
    Solid(Color),
}

impl Background {
    pub fn color(&self, ray: &Ray) -> Color {
        match self {
            Background::Sky => sky_gradient(ray),
            Background::Solid(color) => *color,
        }
    }
}

/// Sky gradient: white at the horizon below, light blue straight up.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize_or_zero();
    let a = 0.5 * (unit_direction.y + 1.0);
    lerp(Color::ONE, Color::new(0.5, 0.7, 1.0), a)
}

/// Knobs of the integrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorSettings {
    /// Number of scatter events followed before a path is cut off
    pub max_depth: u32,
    /// Minimum hit distance
    pub t_min: f32,
    pub background: Background,
}

impl IntegratorSettings {
    /// Bounce limit after applying [`MAX_TRACE_DEPTH`].
    pub fn depth_limit(&self) -> u32 {
        self.max_depth.min(MAX_TRACE_DEPTH)
    }
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            t_min: SHADOW_EPSILON,
            background: Background::Sky,
        }
    }
}

/// Radiance carried by one path, plus how many times it scattered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub radiance: Color,
    pub bounces: u32,
}

/// Compute the linear radiance arriving along `ray`.
///
/// `depth` is the number of bounces already taken; callers start at 0.
pub fn generate_color(
    ray: &Ray,
    scene: &Scene,
    time: f32,
    depth: u32,
    settings: &IntegratorSettings,
    rng: &mut dyn RngCore,
) -> Color {
    trace_path(ray, scene, time, depth, settings, rng).radiance
}

/// Same as [`generate_color`] but also reports the bounce count.
pub fn trace_path(
    ray: &Ray,
    scene: &Scene,
    time: f32,
    depth: u32,
    settings: &IntegratorSettings,
    rng: &mut dyn RngCore,
) -> PathSample {
    let Some(hit) = scene.hit(ray, time, settings.t_min, f32::INFINITY) else {
        return PathSample {
            radiance: settings.background.color(ray),
            bounces: depth,
        };
    };

    let emitted = hit.material.emit(hit.uv, hit.point);
    if depth >= settings.depth_limit() {
        return PathSample {
            radiance: emitted,
            bounces: depth,
        };
    }

    match hit.material.scatter(ray, &hit, rng) {
        Some(scatter) => {
            let incoming = trace_path(&scatter.scattered, scene, time, depth + 1, settings, rng);
            PathSample {
                radiance: emitted + scatter.attenuation * incoming.radiance,
                bounces: incoming.bounces,
            }
        }
        None => PathSample {
            radiance: emitted,
            bounces: depth,
        },
    }
}
