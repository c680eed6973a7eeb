//! Gradient (Perlin) noise.

use crate::sampling::random_unit_vector;
use rand::{Rng, RngCore};
use sawass_math::{smoothstep, Vec3};

const POINT_COUNT: usize = 256;
const POINT_MASK: i32 = POINT_COUNT as i32 - 1;

/// Default octave count for [`Perlin::turbulence`].
pub const DEFAULT_TURBULENCE_DEPTH: u32 = 7;

/// Lattice of random unit gradients addressed through three permutation
/// tables, one per axis.
///
/// The tables are drawn from the generator handed to [`Perlin::new`], so two
/// instances built from equally seeded generators produce identical noise.
#[derive(Clone, Debug)]
pub struct Perlin {
    gradients: Vec<Vec3>,
    perm_x: Vec<usize>,
    perm_y: Vec<usize>,
    perm_z: Vec<usize>,
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let gradients = (0..POINT_COUNT).map(|_| random_unit_vector(rng)).collect();

        Self {
            gradients,
            perm_x: generate_perm(rng),
            perm_y: generate_perm(rng),
            perm_z: generate_perm(rng),
        }
    }

    /// Noise value at `p`, roughly in `[-1, 1]`. Zero on every lattice point.
    pub fn noise(&self, p: Vec3) -> f32 {
        let floor = p.floor();
        let frac = p - floor;
        let i = floor.x as i32;
        let j = floor.y as i32;
        let k = floor.z as i32;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    // Masking wraps negative lattice coordinates as well.
                    let idx = self.perm_x[((i + di as i32) & POINT_MASK) as usize]
                        ^ self.perm_y[((j + dj as i32) & POINT_MASK) as usize]
                        ^ self.perm_z[((k + dk as i32) & POINT_MASK) as usize];
                    *cell = self.gradients[idx];
                }
            }
        }

        interpolate(&c, frac)
    }

    /// Sum of `depth` octaves of noise with halving weight, made positive.
    pub fn turbulence(&self, p: Vec3, depth: u32) -> f32 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }
}

/// Fisher-Yates shuffled identity permutation of `0..POINT_COUNT`.
fn generate_perm(rng: &mut dyn RngCore) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..POINT_COUNT).collect();
    for i in (1..POINT_COUNT).rev() {
        let target = rng.gen_range(0..=i);
        perm.swap(i, target);
    }
    perm
}

/// Trilinear blend of the gradient contributions with Hermite smoothing.
fn interpolate(c: &[[[Vec3; 2]; 2]; 2], frac: Vec3) -> f32 {
    let uu = smoothstep(frac.x);
    let vv = smoothstep(frac.y);
    let ww = smoothstep(frac.z);

    let mut accum = 0.0;
    for (i, plane) in c.iter().enumerate() {
        let fi = i as f32;
        for (j, row) in plane.iter().enumerate() {
            let fj = j as f32;
            for (k, gradient) in row.iter().enumerate() {
                let fk = k as f32;
                let weight = Vec3::new(frac.x - fi, frac.y - fj, frac.z - fk);
                accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                    * (fj * vv + (1.0 - fj) * (1.0 - vv))
                    * (fk * ww + (1.0 - fk) * (1.0 - ww))
                    * gradient.dot(weight);
            }
        }
    }
    accum
}
