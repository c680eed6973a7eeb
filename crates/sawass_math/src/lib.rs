//! Sawass math kernel.
//!
//! Vector algebra comes from glam (re-exported wholesale); this crate adds the
//! ray and bounding-box types shared by the tracer plus a few scalar helpers.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod ray;
mod scalar;

pub use aabb::Aabb;
pub use ray::Ray;
pub use scalar::{clamp, degrees_to_radians, lerp, smoothstep, Lerp};

/// RGB colour stored in linear space. Shares the vector type so colours,
/// points and directions compose with the same operators.
pub type Color = Vec3;
