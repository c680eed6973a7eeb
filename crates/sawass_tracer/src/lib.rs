//! Sawass tracer - CPU Monte Carlo path tracing.
//!
//! The core of the renderer: ray/sphere intersection, a bounding volume
//! hierarchy, the material scattering model, procedural and image textures,
//! the thin-lens camera and the recursive integrator. A small single-threaded
//! driver in [`renderer`] turns a camera and scene into an image.
//!
//! All sampling goes through an explicit `&mut dyn RngCore`, so a render is
//! reproducible from its seed.

mod bvh;
mod camera;
mod error;
mod hittable;
mod integrator;
mod material;
mod perlin;
pub mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use error::{TracerError, TracerResult};
pub use hittable::{Hit, Hittable, HittableList};
pub use integrator::{
    generate_color, sky_gradient, trace_path, Background, IntegratorSettings, PathSample,
    DEFAULT_MAX_DEPTH, MAX_TRACE_DEPTH, SHADOW_EPSILON,
};
pub use material::{reflect, refract, schlick, Material, Scatter};
pub use perlin::Perlin;
pub use renderer::{pixel_offsets, render, render_pixel, ImageBuffer, RenderConfig};
pub use sampling::{gen_f32, random_in_unit_disk, random_in_unit_sphere, random_unit_vector};
pub use scene::Scene;
pub use sphere::{Motion, Sphere};
pub use texture::{ImageTexture, Texture};

/// Re-export Vec3 and common math types from sawass_math
pub use sawass_math::{Aabb, Color, Ray, Vec2, Vec3};
