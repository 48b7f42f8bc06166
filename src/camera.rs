use serde::{ Serialize, Deserialize };
use tracing::debug;

use crate::consts::FOCAL_DISTANCE;
use crate::vector::Vector3;
use crate::ray::Ray;
use crate::world::World;
use crate::canvas::Canvas;

/// A pinhole camera.
///
/// The camera sits at the origin looking down -Z. Its viewport is a
/// `width` by `height` rectangle (in world units) centered on the Z axis at
/// unit distance from the pinhole.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub width: f64,
    pub height: f64,
}

impl Camera {
    pub fn new(width: f64, height: f64) -> Camera {
        Camera { width, height }
    }
}

/// Maps the pixels of an output image onto a camera's viewport.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rasterizer {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    pub half_width: f64,
    pub half_height: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl Rasterizer {
    pub fn new(camera: &Camera, hsize: usize, vsize: usize) -> Rasterizer {
        Rasterizer {
            hsize,
            vsize,
            half_width: camera.width / 2.0,
            half_height: camera.height / 2.0,
            pixel_width: camera.width / hsize as f64,
            pixel_height: camera.height / vsize as f64,
        }
    }

    /// Creates the ray through the center of pixel (`px`, `py`).
    ///
    /// Pixel rows are counted from the top of the image, so `py = 0` looks
    /// towards +Y.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray {
        // The same row counted from the bottom, where world Y is lowest
        let row = self.vsize - 1 - py;

        let world_x = -self.half_width + self.pixel_width * (px as f64 + 0.5);
        let world_y = -self.half_height + self.pixel_height * (row as f64 + 0.5);

        let direction = Vector3::new(world_x, world_y, -FOCAL_DISTANCE);
        Ray::new(Vector3::zero(), direction.normalize())
    }

    /// Traces every pixel of row `py` into `row`, left to right.
    ///
    /// Used by the parallel renderer, which hands out the canvas row by row.
    pub fn render_row(&self, w: &World, py: usize, row: &mut [[u8; 3]]) {
        for (px, pixel) in row.iter_mut().enumerate() {
            let ray = self.ray_for_pixel(px, py);
            *pixel = w.color_at(ray, 0, false).to_rgb8();
        }
    }

    /// Renders the world on the calling thread, top row first.
    pub fn render(&self, w: &World) -> Canvas {
        let mut image = Canvas::new(self.hsize, self.vsize);
        debug!(width = self.hsize, height = self.vsize, "rendering sequentially");

        for py in 0..self.vsize {
            for px in 0..self.hsize {
                let ray = self.ray_for_pixel(px, py);
                let color = w.color_at(ray, 0, false);
                image.write_pixel(px, py, &color);
            }
        }

        image
    }
}

#[cfg(test)]
use crate::scene::Scene;
#[cfg(test)]
use crate::shape::Shape;
#[cfg(test)]
use crate::light::{ Light, Material };
#[cfg(test)]
use crate::color::Color;

#[cfg(test)]
fn red_sphere_world() -> World {
    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0)
        .with_material(Material {
            color: Some(Color::red()),
            diffuse_color: Color::red(),
            specular_color: Color::black(),
            ..Default::default()
        }));
    scene.lights.push(Light::point(Color::white(), Vector3::zero(),
        1.0, 0.0, 0.0));

    World::new(scene, Default::default())
}

#[test]
fn ray_through_center() {
    let r = Rasterizer::new(&Camera::new(2.0, 2.0), 201, 101)
        .ray_for_pixel(100, 50);

    assert_eq!(r.origin, Vector3::zero());
    assert_eq!(r.direction, Vector3::new(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corners() {
    let raster = Rasterizer::new(&Camera::new(2.0, 2.0), 2, 2);

    let top_left = raster.ray_for_pixel(0, 0);
    assert_eq!(top_left.direction,
        Vector3::new(-0.5, 0.5, -1.0).normalize());

    let bottom_right = raster.ray_for_pixel(1, 1);
    assert_eq!(bottom_right.direction,
        Vector3::new(0.5, -0.5, -1.0).normalize());
}

#[test]
fn pixel_size_follows_viewport() {
    let raster = Rasterizer::new(&Camera::new(4.0, 1.0), 8, 4);

    assert_eq!(raster.pixel_width, 0.5);
    assert_eq!(raster.pixel_height, 0.25);

    let r = raster.ray_for_pixel(7, 3);
    assert_eq!(r.direction, Vector3::new(1.75, -0.375, -1.0).normalize());
}

#[test]
fn two_by_two_red_sphere() {
    let w = red_sphere_world();
    let raster = Rasterizer::new(&w.scene.camera, 2, 2);
    let image = raster.render(&w);

    assert_eq!(image.pixels().len(), 4);

    for py in 0..2 {
        for px in 0..2 {
            let ray = raster.ray_for_pixel(px, py);
            let [r, g, b] = image.read_pixel(px, py).unwrap();

            assert_eq!((g, b), (0, 0));
            if w.scene.objects[0].intersect(&ray).is_some() {
                assert!(r > 0);
            } else {
                assert_eq!(r, 0);
            }
        }
    }
}

#[test]
fn center_ray_sees_red_sphere() {
    let w = red_sphere_world();
    let image = Rasterizer::new(&w.scene.camera, 3, 3).render(&w);

    // Lit head-on at distance 4 with no falloff: full red.
    assert_eq!(image.read_pixel(1, 1), Some([255, 0, 0]));

    // At a 90 degree field of view the corners miss a sphere this small.
    assert_eq!(image.read_pixel(0, 0), Some([0, 0, 0]));
    assert_eq!(image.read_pixel(2, 2), Some([0, 0, 0]));
}

#[test]
fn top_of_image_is_positive_y() {
    let mut scene = Scene::new(Camera::new(2.0, 2.0));
    scene.objects.push(Shape::sphere(Vector3::new(0.0, 2.0, -3.0), 0.5));
    scene.lights.push(Light::point(Color::white(), Vector3::zero(),
        1.0, 0.0, 0.0));
    let w = World::new(scene, Default::default());

    let image = Rasterizer::new(&w.scene.camera, 3, 3).render(&w);

    assert_ne!(image.read_pixel(1, 0), Some([0, 0, 0]));
    assert_eq!(image.read_pixel(1, 2), Some([0, 0, 0]));
}
