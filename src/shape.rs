use crate::consts::PARALLEL_SENTINEL;
use crate::vector::Vector3;
use crate::ray::Ray;
use crate::light::Material;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A sphere around `center`.
    Sphere { center: Vector3, radius: f64 },

    /// An infinite plane through `position`. The normal may be stored
    /// unnormalized; it is normalized whenever it is used.
    Plane { position: Vector3, normal: Vector3 },
}

/// A primitive which rays can hit, paired with its surface material.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shape {
    pub ty: ShapeType,
    pub material: Material,
}

impl Shape {
    /// Creates a sphere with the default material.
    pub fn sphere(center: Vector3, radius: f64) -> Shape {
        Shape {
            ty: ShapeType::Sphere { center, radius },
            material: Default::default(),
        }
    }

    /// Creates a plane with the default material.
    pub fn plane(position: Vector3, normal: Vector3) -> Shape {
        Shape {
            ty: ShapeType::Plane { position, normal },
            material: Default::default(),
        }
    }

    /// Replaces the material of this shape.
    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// Returns a reference to this Shape's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Spheres enclose a volume, so refracted rays move in and out of them.
    pub fn is_sphere(&self) -> bool {
        matches!(self.ty, ShapeType::Sphere { .. })
    }

    /// Intersects a ray with this shape, keeping only forward hits.
    ///
    /// Returns `None` if the ray misses, or if the only intersection lies at or
    /// behind the ray origin.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        match self.ty {
            ShapeType::Sphere { center, radius } =>
                intersect_sphere(ray, center, radius),
            ShapeType::Plane { position, normal } => {
                let t = intersect_plane(ray, position, normal);
                if t > 0.0 { Some(t) } else { None }
            },
        }
    }

    /// Obtains the unit surface normal at a point on this shape.
    ///
    /// For spheres this is the direction from the center to `at`; for planes it
    /// is the stored normal, the same at every point.
    pub fn normal_at(&self, at: Vector3) -> Vector3 {
        match self.ty {
            ShapeType::Sphere { center, .. } => (at - center).normalize(),
            ShapeType::Plane { normal, .. } => normal.normalize(),
        }
    }
}

/// Intersects a ray with a sphere.
///
/// Solves `a t^2 + b t + c = 0` for the ray `origin + t * direction`. The
/// direction need not be unit length.
///
/// A tangent ray (zero discriminant) counts as a miss. Otherwise the nearer
/// root is returned if it is positive, else the farther root if that one is;
/// this is what happens for rays which start inside the sphere.
pub fn intersect_sphere(ray: &Ray, center: Vector3, radius: f64)
    -> Option<f64> {
    let sphere_to_ray = ray.origin - center;

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - radius * radius;

    let discriminant = b.powi(2) - (4.0 * a * c);
    if discriminant <= 0.0 {
        return None;
    }

    let near = (-b - discriminant.sqrt()) / (2.0 * a);
    let far = (-b + discriminant.sqrt()) / (2.0 * a);

    if near > 0.0 {
        Some(near)
    } else if far > 0.0 {
        Some(far)
    } else {
        None
    }
}

/// Intersects a ray with a plane.
///
/// Returns the signed distance along the ray, which is negative when the plane
/// lies behind the origin. A ray parallel to the plane yields
/// `PARALLEL_SENTINEL` (`-1.0`). Callers wanting forward hits must check
/// `t > 0` themselves; `Shape::intersect` does so.
pub fn intersect_plane(ray: &Ray, position: Vector3, normal: Vector3) -> f64 {
    let normal = normal.normalize();

    let dist = -normal.dot(&position);
    let den = normal.dot(&ray.direction);

    if den == 0.0 {
        return PARALLEL_SENTINEL;
    }

    -(normal.dot(&ray.origin) + dist) / den
}

#[cfg(test)]
use crate::feq;

#[test]
fn ray_pierces_sphere_front_face() {
    for &radius in [0.5, 1.0, 2.0].iter() {
        let r = Ray::new(
            Vector3::new(0.0, 0.0, -5.0),
            Vector3::new(0.0, 0.0, 1.0)
        );

        let t = intersect_sphere(&r, Vector3::zero(), radius)
            .expect("Ray through the center should hit.");
        assert!(feq(t, 5.0 - radius));
    }
}

#[test]
fn ray_misses_sphere() {
    let r = Ray::new(
        Vector3::new(0.0, 2.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert_eq!(intersect_sphere(&r, Vector3::zero(), 1.0), None);
}

#[test]
fn tangent_ray_is_a_miss() {
    let r = Ray::new(
        Vector3::new(0.0, 1.0, -5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert_eq!(intersect_sphere(&r, Vector3::zero(), 1.0), None);
}

#[test]
fn ray_inside_sphere_hits_far_side() {
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, 1.0));

    assert_eq!(intersect_sphere(&r, Vector3::zero(), 1.0), Some(1.0));
}

#[test]
fn sphere_behind_ray() {
    let r = Ray::new(
        Vector3::new(0.0, 0.0, 5.0),
        Vector3::new(0.0, 0.0, 1.0)
    );

    assert_eq!(intersect_sphere(&r, Vector3::zero(), 1.0), None);
}

#[test]
fn unnormalized_direction_scales_distance() {
    let r = Ray::new(
        Vector3::new(0.0, 0.0, -5.0),
        Vector3::new(0.0, 0.0, 2.0)
    );

    let t = intersect_sphere(&r, Vector3::zero(), 1.0).unwrap();
    assert!(feq(t, 2.0));
}

#[test]
fn translated_sphere() {
    let r = Ray::new(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, -1.0)
    );

    let t = intersect_sphere(&r, Vector3::new(0.0, 0.0, -5.0), 1.0).unwrap();
    assert!(feq(t, 4.0));
}

#[test]
fn ray_intersecting_plane_from_above() {
    let r = Ray::new(
        Vector3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let t = intersect_plane(&r, Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    assert!(feq(t, 5.0));
}

#[test]
fn unnormalized_plane_normal() {
    let r = Ray::new(
        Vector3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0)
    );

    let t = intersect_plane(&r, Vector3::new(3.0, 1.0, 0.0),
        Vector3::new(0.0, 4.0, 0.0));
    assert!(feq(t, 4.0));
}

#[test]
fn ray_parallel_to_plane() {
    let r = Ray::new(
        Vector3::new(0.0, 5.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    let t = intersect_plane(&r, Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(t, PARALLEL_SENTINEL);
}

#[test]
fn plane_behind_ray_is_negative() {
    let r = Ray::new(
        Vector3::new(0.0, 5.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0)
    );

    let t = intersect_plane(&r, Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    assert!(feq(t, -5.0));

    let p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(p.intersect(&r), None);
}

#[test]
fn normal_on_sphere_nonaxial() {
    let s = Shape::sphere(Vector3::new(1.0, 1.0, 1.0), 3.0f64.sqrt());
    let n = s.normal_at(Vector3::new(2.0, 2.0, 2.0));
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(n, Vector3::new(k, k, k));
}

#[test]
fn normal_on_plane_is_constant_and_unit() {
    let p = Shape::plane(Vector3::zero(), Vector3::new(0.0, 0.0, 2.0));

    assert_eq!(p.normal_at(Vector3::new(10.0, 0.0, 0.0)),
        Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(p.normal_at(Vector3::new(-5.0, 150.0, 0.0)),
        Vector3::new(0.0, 0.0, 1.0));
}
