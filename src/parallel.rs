use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use crate::world::World;
use crate::camera::Rasterizer;
use crate::canvas::Canvas;
use crate::error::RenderError;

/// Renders the world with one rayon task per image row.
///
/// Each task writes only the pixels of its own row, so no locking is needed
/// and the result is identical to `Rasterizer::render`. If the world's
/// settings name a thread count, a dedicated pool of that size is built;
/// otherwise rayon's global pool is used.
pub fn parallel_render(world: &World, raster: &Rasterizer)
    -> Result<Canvas, RenderError> {
    let mut canvas = Canvas::new(raster.hsize, raster.vsize);
    if raster.hsize == 0 || raster.vsize == 0 {
        return Ok(canvas);
    }

    let render = |canvas: &mut Canvas| {
        debug!(width = raster.hsize, height = raster.vsize,
            threads = rayon::current_num_threads(), "rendering in parallel");

        canvas.pixels_mut()
            .par_chunks_mut(raster.hsize)
            .enumerate()
            .for_each(|(py, row)| raster.render_row(world, py, row));
    };

    match world.settings.threads {
        Some(threads) => {
            let pool = ThreadPoolBuilder::new().num_threads(threads).build()?;
            pool.install(|| render(&mut canvas));
        },
        None => render(&mut canvas),
    }

    Ok(canvas)
}

#[cfg(test)]
use crate::vector::Vector3;
#[cfg(test)]
use crate::color::Color;
#[cfg(test)]
use crate::scene::Scene;
#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::light::{ Light, Material };
#[cfg(test)]
use crate::camera::Camera;
#[cfg(test)]
use crate::config::RenderSettings;

#[cfg(test)]
fn busy_scene() -> Scene {
    let mut scene = Scene::new(Camera::new(2.0, 1.5));

    scene.objects.push(Shape::plane(Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0)).with_material(Material {
            diffuse_color: Color::rgb(0.6, 0.6, 0.6),
            reflectivity: 0.3,
            ..Default::default()
        }));
    scene.objects.push(Shape::sphere(Vector3::new(-0.8, 0.0, -4.0), 1.0)
        .with_material(Material {
            diffuse_color: Color::rgb(0.1, 0.2, 0.9),
            specular_color: Color::white(),
            refractivity: 0.6,
            ior: 1.5,
            ..Default::default()
        }));
    scene.objects.push(Shape::sphere(Vector3::new(1.2, 0.2, -6.0), 1.0)
        .with_material(Material {
            diffuse_color: Color::rgb(0.9, 0.3, 0.1),
            reflectivity: 0.5,
            ..Default::default()
        }));

    scene.lights.push(Light::point(Color::white(),
        Vector3::new(-3.0, 4.0, 0.0), 1.0, 0.05, 0.0));
    scene.lights.push(Light::point(Color::rgb(0.5, 0.5, 0.2),
        Vector3::new(3.0, 5.0, -2.0), 1.0, 0.0, 0.01)
        .with_spot(Vector3::new(-0.3, -1.0, -0.5), 40.0, 2.0));

    scene
}

#[test]
fn parallel_matches_sequential() {
    let w = World::new(busy_scene(), RenderSettings::default());
    let raster = Rasterizer::new(&w.scene.camera, 32, 24);

    let sequential = raster.render(&w);
    let parallel = parallel_render(&w, &raster).unwrap();

    assert_eq!(parallel, sequential);
    assert!(parallel.pixels().iter().any(|p| *p != [0, 0, 0]));
}

#[test]
fn fixed_thread_count_matches_sequential() {
    let settings = RenderSettings::default().with_threads(Some(2));
    let w = World::new(busy_scene(), settings);
    let raster = Rasterizer::new(&w.scene.camera, 16, 12);

    assert_eq!(parallel_render(&w, &raster).unwrap(), raster.render(&w));
}

#[test]
fn empty_image() {
    let w = World::new(busy_scene(), RenderSettings::default());
    let raster = Rasterizer::new(&w.scene.camera, 0, 0);

    let canvas = parallel_render(&w, &raster).unwrap();
    assert!(canvas.pixels().is_empty());
}
