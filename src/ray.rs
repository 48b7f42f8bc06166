use crate::vector::Vector3;

/// A ray, starting at `origin` and travelling along `direction`.
///
/// The direction is not required to be unit length; the sphere solver accounts
/// for its magnitude. Rays spawned by the tracer are always normalized.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Ray {
        Ray { origin, direction }
    }

    /// The point at parametric distance `t` along the ray.
    pub fn position(&self, t: f64) -> Vector3 {
        self.origin + (t * self.direction)
    }

    /// Builds a secondary ray leaving `point` along `direction`.
    ///
    /// The origin is pushed `bias * direction` away from the surface so the
    /// new ray does not immediately hit the surface it left. The returned
    /// direction is normalized.
    pub fn biased(point: Vector3, direction: Vector3, bias: f64) -> Ray {
        Ray {
            origin: point + direction * bias,
            direction: direction.normalize(),
        }
    }
}

#[test]
fn ray_position() {
    let r = Ray::new(
        Vector3::new(2.0, 3.0, 4.0),
        Vector3::new(1.0, 0.0, 0.0)
    );

    assert_eq!(r.position(0.0), Vector3::new(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Vector3::new(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Vector3::new(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Vector3::new(4.5, 3.0, 4.0));
}

#[test]
fn biased_ray_is_offset_and_normalized() {
    let r = Ray::biased(
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.0, 2.0, 0.0),
        0.5
    );

    assert_eq!(r.origin, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(r.direction, Vector3::new(0.0, 1.0, 0.0));
}
