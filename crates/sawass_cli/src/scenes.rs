//! Built-in demo scenes.

use std::fmt;

use anyhow::{Context, Result};
use clap::ValueEnum;
use rand::{Rng, RngCore};
use sawass_math::{Color, Vec3};
use sawass_tracer::{Background, Camera, Material, Scene, Sphere, Texture};

/// Names accepted by `--scene`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DemoScene {
    /// Field of small random spheres around three large ones.
    #[default]
    Random,
    /// Two spheres with Perlin noise textures.
    Perlin,
    /// A small sphere resting on a large ground sphere.
    Ground,
    /// Noise spheres lit by an emissive sphere, no sky.
    Lights,
}

impl DemoScene {
    pub fn name(self) -> &'static str {
        match self {
            DemoScene::Random => "random",
            DemoScene::Perlin => "perlin",
            DemoScene::Ground => "ground",
            DemoScene::Lights => "lights",
        }
    }

    /// Build the scene and a camera framing it for the given aspect ratio.
    pub fn build(self, aspect_ratio: f32, rng: &mut dyn RngCore) -> Result<Demo> {
        match self {
            DemoScene::Random => random_spheres(aspect_ratio, rng),
            DemoScene::Perlin => Ok(perlin_spheres(aspect_ratio, rng)),
            DemoScene::Ground => Ok(ground(aspect_ratio)),
            DemoScene::Lights => Ok(lights(aspect_ratio, rng)),
        }
    }
}

impl fmt::Display for DemoScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A ready-to-render scene.
pub struct Demo {
    pub scene: Scene,
    pub camera: Camera,
    /// Background the scene is meant to be seen against, if not the sky
    pub background: Option<Background>,
}

fn random_spheres(aspect_ratio: f32, rng: &mut dyn RngCore) -> Result<Demo> {
    let mut scene = Scene::with_capacity(500);

    let checker = Texture::checker(Color::new(0.2, 0.3, 0.1), Color::new(0.9, 0.9, 0.9));
    scene.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(checker),
    ));

    for a in -10..10 {
        for b in -10..10 {
            let choose = rng.gen::<f32>();
            let center = Vec3::new(
                a as f32 + 0.9 * rng.gen::<f32>(),
                0.2,
                b as f32 + 0.9 * rng.gen::<f32>(),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose < 0.8 {
                // Diffuse, bouncing up during the shutter
                let end = center + Vec3::new(0.0, 0.5 * rng.gen::<f32>(), 0.0);
                let albedo = Color::new(
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                    rng.gen::<f32>() * rng.gen::<f32>(),
                );
                scene.add(Sphere::moving(
                    center,
                    end,
                    0.0,
                    1.0,
                    0.2,
                    Material::lambertian(albedo),
                ));
            } else if choose < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 + rng.gen::<f32>()),
                    0.5 * (1.0 + rng.gen::<f32>()),
                    0.5 * (1.0 + rng.gen::<f32>()),
                );
                let fuzz = 0.5 * rng.gen::<f32>();
                scene.add(Sphere::new(center, 0.2, Material::metal(albedo, fuzz)));
            } else {
                scene.add(Sphere::new(center, 0.2, Material::dielectric(1.5)));
            }
        }
    }

    scene.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)));
    scene.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    scene.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    let scene = scene
        .into_bvh(0.0, 1.0)
        .context("failed to build BVH for the random scene")?;

    let camera = Camera::new(Vec3::new(-13.0, 2.0, 3.0), Vec3::ZERO, aspect_ratio, 25.0, 0.0)
        .with_shutter(0.0, 1.0);

    Ok(Demo {
        scene,
        camera,
        background: None,
    })
}

fn perlin_spheres(aspect_ratio: f32, rng: &mut dyn RngCore) -> Demo {
    let mut scene = Scene::with_capacity(2);
    scene.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(Texture::noise(1.0, rng)),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Material::lambertian(Texture::noise(2.0, rng)),
    ));

    let camera = Camera::new(
        Vec3::new(-13.0, 2.0, 3.0),
        Vec3::new(0.0, 1.0, 0.0),
        aspect_ratio,
        25.0,
        0.0,
    );

    Demo {
        scene,
        camera,
        background: None,
    }
}

fn ground(aspect_ratio: f32) -> Demo {
    let mut scene = Scene::with_capacity(2);
    scene.add(Sphere::new(
        Vec3::new(0.0, -100.0, -1.0),
        100.0,
        Material::lambertian(Color::new(0.8, 0.8, 0.0)),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.0, 0.5, -1.0),
        0.5,
        Material::lambertian(Color::new(0.1, 0.2, 0.5)),
    ));

    let camera = Camera::new(
        Vec3::new(0.0, 1.0, 1.0),
        Vec3::new(0.0, 0.25, -1.0),
        aspect_ratio,
        60.0,
        0.0,
    );

    Demo {
        scene,
        camera,
        background: None,
    }
}

fn lights(aspect_ratio: f32, rng: &mut dyn RngCore) -> Demo {
    let mut scene = Scene::with_capacity(4);
    scene.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(Texture::noise(4.0, rng)),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.0, 2.0, 0.0),
        2.0,
        Material::lambertian(Texture::noise(4.0, rng)),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.0, 2.0, 4.0),
        1.0,
        Material::metal(Color::new(0.8, 0.85, 0.88), 0.05),
    ));
    scene.add(Sphere::new(
        Vec3::new(0.0, 7.0, 0.0),
        2.0,
        Material::diffuse_light(Color::splat(4.0)),
    ));

    let camera = Camera::new(
        Vec3::new(26.0, 3.0, 6.0),
        Vec3::new(0.0, 2.0, 0.0),
        aspect_ratio,
        20.0,
        0.0,
    );

    Demo {
        scene,
        camera,
        background: Some(Background::Solid(Color::ZERO)),
    }
}
