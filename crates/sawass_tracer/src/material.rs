//! Surface scattering model.

use rand::RngCore;
use sawass_math::{Color, Vec2, Vec3};

use crate::sampling::{gen_f32, random_in_unit_sphere};
use crate::{Hit, Ray, Texture};

/// Outcome of a successful scatter: the colour filter applied to whatever
/// light the new ray brings back, and the new ray itself.
#[derive(Debug, Clone, Copy)]
pub struct Scatter {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// Describes how light interacts with a surface.
#[derive(Clone, Debug)]
pub enum Material {
    /// Ideal diffuse reflector.
    Lambertian { albedo: Texture },
    /// Specular reflector; `fuzz` in `[0, 1]` perturbs the mirror direction.
    Metal { albedo: Color, fuzz: f32 },
    /// Clear refractive material such as glass (1.5) or diamond (2.4).
    Dielectric { refractive_index: f32 },
    /// Light source. Emits its texture and absorbs everything it receives.
    DiffuseLight { emitter: Texture },
}

impl Material {
    pub fn lambertian(albedo: impl Into<Texture>) -> Self {
        Material::Lambertian {
            albedo: albedo.into(),
        }
    }

    /// Metal with `fuzz` clamped into `[0, 1]`; 0 is a perfect mirror.
    pub fn metal(albedo: Color, fuzz: f32) -> Self {
        Material::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn dielectric(refractive_index: f32) -> Self {
        Material::Dielectric { refractive_index }
    }

    pub fn diffuse_light(emitter: impl Into<Texture>) -> Self {
        Material::DiffuseLight {
            emitter: emitter.into(),
        }
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` when the ray is absorbed.
    pub fn scatter(&self, ray_in: &Ray, hit: &Hit, rng: &mut dyn RngCore) -> Option<Scatter> {
        match self {
            Material::Lambertian { albedo } => {
                let target = hit.point + hit.normal + random_in_unit_sphere(rng);
                let mut direction = target - hit.point;

                // Catch degenerate scatter direction
                if direction.length_squared() < 1e-8 {
                    direction = hit.normal;
                }

                Some(Scatter {
                    attenuation: albedo.value(hit.uv, hit.point),
                    scattered: Ray::new(hit.point, direction, ray_in.time()),
                })
            }

            Material::Metal { albedo, fuzz } => {
                let mut direction = reflect(ray_in.direction().normalize_or_zero(), hit.normal);
                // A perfect mirror draws no random numbers.
                if *fuzz > 0.0 {
                    direction += *fuzz * random_in_unit_sphere(rng);
                }

                let scattered = Ray::new(hit.point, direction, ray_in.time());
                if scattered.direction().dot(hit.normal) > 0.0 {
                    Some(Scatter {
                        attenuation: *albedo,
                        scattered,
                    })
                } else {
                    None
                }
            }

            Material::Dielectric { refractive_index } => {
                let ri = *refractive_index;
                let direction = ray_in.direction();
                let d_dot_n = direction.dot(hit.normal);

                let (outward_normal, ratio, cosine) = if d_dot_n > 0.0 {
                    // Leaving the medium; Schlick uses the transmitted angle.
                    let transmitted = 1.0 - ri * ri * (1.0 - d_dot_n * d_dot_n);
                    (-hit.normal, ri, transmitted.max(0.0).sqrt())
                } else {
                    (hit.normal, 1.0 / ri, -d_dot_n)
                };

                let reflected = reflect(direction, hit.normal);
                // Total internal reflection leaves no choice.
                let new_direction = match refract(direction, outward_normal, ratio) {
                    Some(refracted) if gen_f32(rng) >= schlick(cosine, ri) => refracted,
                    _ => reflected,
                };

                Some(Scatter {
                    attenuation: Color::ONE,
                    scattered: Ray::new(hit.point, new_direction, ray_in.time()),
                })
            }

            Material::DiffuseLight { .. } => None,
        }
    }

    /// Light emitted at the given UV coordinates and point. Black for
    /// everything but lights.
    pub fn emit(&self, uv: Vec2, p: Vec3) -> Color {
        match self {
            Material::DiffuseLight { emitter } => emitter.value(uv, p),
            _ => Color::ZERO,
        }
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract `incident` through a surface with unit normal `normal` (on the
/// incident side) and ratio `eta_in / eta_out`.
///
/// Returns `None` on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, refractive_ratio: f32) -> Option<Vec3> {
    let unit = incident.normalize_or_zero();
    let cos_incident = unit.dot(normal);
    let discriminant =
        1.0 - refractive_ratio * refractive_ratio * (1.0 - cos_incident * cos_incident);
    if discriminant > 0.0 {
        Some(refractive_ratio * (unit - normal * cos_incident) - normal * discriminant.sqrt())
    } else {
        None
    }
}

/// Schlick's approximation of Fresnel reflectance.
#[inline]
pub fn schlick(cosine: f32, refractive_index: f32) -> f32 {
    let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
