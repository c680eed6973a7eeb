//! Thin-lens camera for ray generation.

use crate::{gen_f32, random_in_unit_disk, Ray};
use rand::RngCore;
use sawass_math::{degrees_to_radians, lerp, Vec3};

/// Camera that maps normalized image coordinates to world-space rays.
///
/// `s` runs left to right and `t` bottom to top, both in `[0, 1]`. A non-zero
/// aperture gives depth of field around the focus plane; an open shutter
/// gives every ray a random time for motion blur.
#[derive(Clone, Debug)]
pub struct Camera {
    // Positioning
    look_from: Vec3,
    look_at: Vec3,
    world_up: Vec3,

    // Lens settings
    aspect_ratio: f32,
    vfov: f32, // Vertical field of view in degrees
    aperture: f32,
    focus_distance: Option<f32>,

    // Shutter interval
    shutter_open: f32,
    shutter_close: f32,

    // Cached values (set by initialize())
    origin: Vec3,
    lower_left: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    lens_radius: f32,
}

impl Camera {
    /// Camera at `look_from` aimed at `look_at`, with `aspect_ratio` =
    /// width / height and the vertical field of view in degrees.
    ///
    /// Focus is at `look_at` and the shutter is closed at time 0 until
    /// changed with the builder methods.
    pub fn new(look_from: Vec3, look_at: Vec3, aspect_ratio: f32, vfov: f32, aperture: f32) -> Self {
        let mut camera = Self {
            look_from,
            look_at,
            world_up: Vec3::Y,
            aspect_ratio,
            vfov,
            aperture,
            focus_distance: None,
            shutter_open: 0.0,
            shutter_close: 0.0,
            origin: look_from,
            lower_left: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            lens_radius: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set the world up vector (default +Y).
    pub fn with_up(mut self, world_up: Vec3) -> Self {
        self.world_up = world_up;
        self.initialize();
        self
    }

    /// Set the distance to the plane of perfect focus.
    pub fn with_focus_distance(mut self, distance: f32) -> Self {
        self.focus_distance = Some(distance);
        self.initialize();
        self
    }

    /// Set the shutter interval rays are timed within.
    pub fn with_shutter(mut self, open: f32, close: f32) -> Self {
        self.shutter_open = open.min(close);
        self.shutter_close = open.max(close);
        self
    }

    /// Recompute the basis and viewport from the current settings.
    fn initialize(&mut self) {
        self.origin = self.look_from;
        self.lens_radius = self.aperture.max(0.0) / 2.0;

        let theta = degrees_to_radians(self.vfov);
        let half_height = (theta / 2.0).tan();
        let half_width = self.aspect_ratio * half_height;

        self.forward = (self.look_from - self.look_at)
            .try_normalize()
            .unwrap_or_else(|| {
                log::warn!("Camera look_from equals look_at, facing -Z");
                Vec3::Z
            });
        self.right = self
            .world_up
            .cross(self.forward)
            .try_normalize()
            .unwrap_or_else(|| {
                log::warn!("Camera view direction is parallel to the up vector");
                self.forward.any_orthonormal_vector()
            });
        self.up = self.forward.cross(self.right);

        let focus = match self.focus_distance {
            Some(distance) if distance > 0.0 => distance,
            _ => {
                let distance = (self.look_from - self.look_at).length();
                if distance > 0.0 {
                    distance
                } else {
                    1.0
                }
            }
        };

        let focal_right = half_width * focus * self.right;
        let focal_up = half_height * focus * self.up;
        let focal_forward = focus * self.forward;

        self.lower_left = self.origin - focal_right - focal_up - focal_forward;
        self.horizontal = 2.0 * focal_right;
        self.vertical = 2.0 * focal_up;
    }

    /// Generate the ray through image coordinates `(s, t)`.
    pub fn trace_ray(&self, s: f32, t: f32, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let p = self.lens_radius * random_in_unit_disk(rng);
            self.right * p.x + self.up * p.y
        } else {
            Vec3::ZERO
        };

        let time = if self.shutter_close > self.shutter_open {
            lerp(self.shutter_open, self.shutter_close, gen_f32(rng))
        } else {
            self.shutter_open
        };

        let origin = self.origin + offset;
        let target = self.lower_left + s * self.horizontal + t * self.vertical;
        Ray::new(origin, target - origin, time)
    }

    /// Shutter interval as `(open, close)`.
    pub fn shutter(&self) -> (f32, f32) {
        (self.shutter_open, self.shutter_close)
    }
}
